//! Command-line interface for locatif.
//!
//! This module provides the CLI structure for the `locatif` binary. Without a
//! subcommand the binary starts the web UI.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{BackupCommand, ConfigCommand, ReceiptCommand, ServeCommand, StatusCommand};

/// locatif - Manage your rental properties
///
/// Keeps track of properties, tenants and payments in a local database and
/// issues rent receipts, through a web interface served on this machine.
#[derive(Debug, Parser)]
#[command(name = "locatif")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the web interface
    Serve(ServeCommand),

    /// Show database location and record counts
    Status(StatusCommand),

    /// Write a rent receipt PDF
    Receipt(ReceiptCommand),

    /// Copy the database to a backup file
    Backup(BackupCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Logging verbosity from `-v` and `-q`.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }

    /// The command to run, `serve` with defaults when none was given.
    #[must_use]
    pub fn command_or_default(self) -> Command {
        self.command
            .unwrap_or_else(|| Command::Serve(ServeCommand::default()))
    }
}
