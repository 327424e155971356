//! Command-line interface module.

mod args;
pub mod finalize;
pub mod head;
pub mod options;

pub use args::{Cli, Commands, FinalizeArgs};
