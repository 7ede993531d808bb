//! hxdeps CLI entry point
//!
//! Parses arguments, runs the command, and prints failures with suggestions.
//!
//! - `resolve` - Source paths and the transitive library set of a project
//! - `sources` - Source paths only
//! - `sdk` - Registered Haxe SDKs
//! - `config` - Project build configuration
//! - `check` - Refresh a project when its build inputs change

use anyhow::Result;
use clap::Parser;
use hxdeps::cli;
use hxdeps::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
