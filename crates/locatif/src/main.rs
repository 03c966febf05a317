//! `locatif` - CLI for the rental-property manager
//!
//! This binary starts the local web interface and provides a few maintenance
//! commands that work directly on the database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use locatif::cli::{
    BackupCommand, Cli, Command, ConfigCommand, ReceiptCommand, ServeCommand,
};
use locatif::web::{self, AppState};
use locatif::{init_logging, Config, Receipt, Storage};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command_or_default() {
        Command::Serve(serve_cmd) => handle_serve(config, &serve_cmd),
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Receipt(receipt_cmd) => handle_receipt(&config, &receipt_cmd),
        Command::Backup(backup_cmd) => handle_backup(&config, &backup_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("cannot open database {}", path.display()))
}

fn handle_serve(mut config: Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    if let Some(port) = cmd.port {
        config.server.port = port;
    }
    if cmd.no_browser {
        config.server.open_browser = false;
    }
    config.validate()?;

    let storage = open_storage(&config)?;
    if config.storage.seed_demo_data {
        storage.seed_demo_properties()?;
    }
    let state = AppState::new(storage.path())?;
    drop(storage);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("cannot start the async runtime")?;
    runtime.block_on(web::serve(&config.server, state))?;
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;
    let landlord = storage.get_landlord()?;

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "properties": stats.properties,
            "tenants": stats.tenants,
            "payments": stats.payments,
            "db_size_bytes": stats.db_size_bytes,
            "landlord_configured": landlord.is_some(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("locatif status");
        println!("--------------");
        println!("Database:      {}", storage.path().display());
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!("Properties:    {}", stats.properties);
        println!("Tenants:       {}", stats.tenants);
        println!("Payments:      {}", stats.payments);
        println!(
            "Landlord:      {}",
            landlord.map_or_else(|| "not configured".to_string(), |l| l.name)
        );
    }
    Ok(())
}

fn handle_receipt(config: &Config, cmd: &ReceiptCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let receipt = Receipt::build(&storage, cmd.tenant_id, cmd.month)?;
    let pdf = receipt.to_pdf()?;

    let output = cmd
        .output
        .clone()
        .unwrap_or_else(|| receipt.filename().into());
    std::fs::write(&output, &pdf)
        .with_context(|| format!("cannot write {}", output.display()))?;

    println!(
        "Receipt for {} ({}), total {}: {}",
        receipt.tenant.display_name(),
        receipt.month.label(),
        receipt.total,
        output.display()
    );
    Ok(())
}

fn handle_backup(config: &Config, cmd: &BackupCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    storage
        .backup_to(&cmd.dest)
        .with_context(|| format!("backup to {} failed", cmd.dest.display()))?;
    println!("Database copied to {}", cmd.dest.display());
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
                println!("  Port attempts:      {}", config.server.port_attempts);
                println!("  Open browser:       {}", config.server.open_browser);
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Seed demo data:     {}", config.storage.seed_demo_data);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
