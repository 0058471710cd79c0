//! Giyo CLI entry point
//!
//! Parses arguments, dispatches to the CLI module and exits non-zero on
//! failure. Configuration and service wiring live in `cli`.

use giyo::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
