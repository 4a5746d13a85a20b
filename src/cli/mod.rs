//! CLI module
//!
//! Command-line interface for paging through July lists.
//!
//! # Commands
//!
//! - `fetch` - Page through a list resource
//! - `labels` - List labels
//! - `validate` - Check a client configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands, FilterArgs, OutputFormat};
pub use runner::Runner;
