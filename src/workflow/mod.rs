pub mod edit_session;
pub mod editor_flow;

pub use edit_session::{EditPhase, EditSession};
pub use editor_flow::EditorFlow;
