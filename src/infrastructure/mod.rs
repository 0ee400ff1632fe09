pub mod js_executor;
pub mod poll;

pub use js_executor::JsExecutor;
pub use poll::{poll_until, WaitResult};
