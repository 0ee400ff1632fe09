pub mod ledger;
pub mod matcher;
pub mod prompt;
pub mod report_writer;

pub use ledger::OutcomeLedger;
pub use matcher::RecordMatcher;
pub use prompt::{AutoConfirm, ConsolePrompt, RunPrompt};
pub use report_writer::{ReportFormat, ReportWriter};
