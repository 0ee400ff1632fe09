pub mod loaders;
pub mod outcome;
pub mod record;
pub mod stats;

pub use loaders::{load_last_input, save_last_input, LastInput};
pub use outcome::{FailReason, Outcome};
pub use record::{MatchDecision, SkipReason};
pub use stats::{RunStats, RunStatus};
