//! CLI module for Giyo
//!
//! Provides command-line interface for:
//! - init: Write a development configuration
//! - check-config: Validate a configuration file
//! - serve: Boot the service graph and run the HTTP API

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_state, check_config, init, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
