//! CLI argument parsing and command handling.

mod args;
mod validators;

pub use args::{Cli, Command, ConfigAction, ExtractArgs};
pub use validators::{parse_jitter_threshold, parse_size};
