//! nrfdfu - nRF5 DFU artifact tool
//!
//! Builds signed update packages, bootloader settings pages and the P-256
//! keys that authenticate them.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod completion;
mod error;
mod logging;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{KeyCommands, PackageCommands, SettingsCommands};
use crate::logging::LogConfig;

#[derive(Parser)]
#[command(name = "nrfdfu")]
#[command(about = "nRF5 DFU tool - update packages, bootloader settings and signing keys")]
#[command(version)]
#[command(long_about = "
nrfdfu produces the artifacts needed to update nRF5 devices over DFU:
signed update packages (zip), bootloader settings pages (Intel HEX) and the
P-256 key pairs used to sign and verify them.

Integer options accept 0x-prefixed hex, 0-prefixed octal or decimal values.
")]
struct Cli {
    /// Verbose logging, repeat for more detail
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write log output to this file
    #[arg(long, global = true, env = "NRFDFU_LOG_FILE", value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootloader settings page commands
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Signing key commands
    #[command(subcommand)]
    Keys(KeyCommands),

    /// Update package commands
    #[command(subcommand)]
    Pkg(PackageCommands),

    /// Print the tool version
    Version,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogConfig::new(cli.verbose, cli.log_file.clone()))?;

    if let Err(e) = execute_command(&cli) {
        output::print_error_human(&e);
        std::process::exit(error::exit_code(&e));
    }
    Ok(())
}

fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Settings(cmd) => commands::settings::execute(cmd),
        Commands::Keys(cmd) => commands::keys::execute(cmd),
        Commands::Pkg(cmd) => commands::package::execute(cmd),
        Commands::Version => {
            println!("nrfdfu version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Completion { shell } => {
            completion::generate_completion(*shell);
            Ok(())
        }
    }
}
