//! CLI argument definitions using clap
//!
//! Commands:
//! - giyo init --config <path>
//! - giyo check-config --config <path>
//! - giyo serve --config <path> [--port <port>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Giyo - brochure and service catalog backend
#[derive(Parser, Debug)]
#[command(name = "giyo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a development configuration file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./giyo.json")]
        config: PathBuf,
    },

    /// Load and validate a configuration file
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./giyo.json")]
        config: PathBuf,
    },

    /// Run the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./giyo.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
