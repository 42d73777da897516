pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::builder::TradeRequest;
use crate::core::config::AppConfig;
use crate::core::{LedgerStore, Metal, Period};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// A command run against the ledger.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Holdings of one metal, or of all metals when `None`.
    Summary { metal: Option<Metal> },
    Trade { metal: Metal, request: TradeRequest },
    History { metal: Metal, period: Period },
    /// `confirmed` skips the interactive prompt.
    Clear { metal: Metal, confirmed: bool },
    SetPrice { metal: Metal, price: String },
    Export {
        metal: Metal,
        period: Period,
        output: Option<PathBuf>,
    },
}

pub async fn run_command(cmd: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Bullion starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_path = config.data_path()?;
    let backend = store::DiskStore::open(&data_path)
        .with_context(|| format!("Failed to open ledger at {}", data_path.display()))?;
    let mut ledger_store = LedgerStore::load(Box::new(backend))?;
    let converter = &config.display;

    match cmd {
        AppCommand::Summary { metal } => {
            let metals = metal.map_or_else(|| Metal::ALL.to_vec(), |m| vec![m]);
            cli::summary::run(&ledger_store, converter, &metals)?;
        }
        AppCommand::Trade { metal, request } => {
            let source = providers::historical_source(&config, ledger_store.ledger());
            cli::trade::run(
                &mut ledger_store,
                source.as_ref(),
                converter,
                metal,
                &request,
            )
            .await?;
        }
        AppCommand::History { metal, period } => {
            cli::history::run(&ledger_store, converter, metal, period)?;
        }
        AppCommand::Clear { metal, confirmed } => {
            cli::clear::run(&mut ledger_store, metal, confirmed)?;
        }
        AppCommand::SetPrice { metal, price } => {
            cli::price::run(&mut ledger_store, converter, metal, &price)?;
        }
        AppCommand::Export {
            metal,
            period,
            output,
        } => {
            cli::export::run(&ledger_store, converter, metal, period, output.as_deref())?;
        }
    }

    ledger_store.close()?;
    Ok(())
}
