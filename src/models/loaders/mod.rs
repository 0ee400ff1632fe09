pub mod last_input;

pub use last_input::{load_last_input, save_last_input, LastInput};
