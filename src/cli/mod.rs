//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod export;
mod logging;
mod smoke;
mod version;

pub use commands::{handle_config_command, ConfigSubcommand};
pub use export::{handle_run, RunArgs};
pub use logging::*;
pub use smoke::{handle_test_client, TestClientArgs};
pub use version::display_version;
