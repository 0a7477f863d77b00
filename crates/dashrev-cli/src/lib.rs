//! dashrev command-line client
//!
//! Hosts a `HistoryController` in the terminal: lists the revision log,
//! compares two versions and restores an earlier one.

pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod router;
pub mod settings;

pub use error::{CliError, CliResult};
pub use router::{Cli, Commands, CommandRouter};
pub use settings::CliSettings;
