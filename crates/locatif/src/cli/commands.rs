//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::model::Month;

/// Web UI arguments.
#[derive(Debug, Clone, Default, Args)]
pub struct ServeCommand {
    /// First port to try (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Don't open the dashboard in a browser
    #[arg(long)]
    pub no_browser: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Receipt command arguments.
#[derive(Debug, Args)]
pub struct ReceiptCommand {
    /// Tenant id, as shown on the tenant list
    pub tenant_id: i64,

    /// Month covered, as YYYY-MM
    pub month: Month,

    /// Where to write the PDF (defaults to quittance-<id>-<month>.pdf)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Backup command arguments.
#[derive(Debug, Args)]
pub struct BackupCommand {
    /// Destination file; must not exist yet
    pub dest: PathBuf,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to config file to validate
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_command_default() {
        let cmd = ServeCommand::default();
        assert!(cmd.port.is_none());
        assert!(!cmd.no_browser);
    }

    #[test]
    fn test_status_command_debug() {
        let cmd = StatusCommand { json: true };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("json"));
    }

    #[test]
    fn test_receipt_command_debug() {
        let cmd = ReceiptCommand {
            tenant_id: 3,
            month: Month::new(2024, 3).unwrap(),
            output: None,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("tenant_id"));
        assert!(debug_str.contains("2024"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
