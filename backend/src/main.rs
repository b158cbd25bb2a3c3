mod core;
mod infra;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::app::Storefront;
use crate::core::cart::CartStore;
use crate::core::catalog::Catalog;
use crate::core::storage::{MemorySlot, StorageError};
use infra::config::{Config, StorageMode};
use infra::database::SqlSlot;
use infra::file_slot::FileSlot;
use infra::terminal::TerminalInput;
use infra::web::{AppState, DynSlot};

fn main() {
    // A missing .env is fine; deployments set real env vars.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let catalog = match &config.catalog_path {
        Some(path) => infra::catalog_file::load_catalog(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
        None => Catalog::builtin(),
    };
    info!(products = catalog.len(), "catalog ready");

    // Built before any async runtime exists: the SQL slot owns its own.
    let slot = open_slot(&config)
        .with_context(|| format!("Failed to open {:?} storage", config.storage))?;
    let cart = CartStore::open_with_key(slot, &config.cart_key);

    if std::env::args().any(|a| a == "--cli") {
        Storefront::new(catalog, cart, TerminalInput).run();
        Ok(())
    } else {
        run_web(catalog, cart, config.port)
    }
}

fn open_slot(config: &Config) -> Result<DynSlot, StorageError> {
    let slot: DynSlot = match config.storage {
        StorageMode::File => Box::new(FileSlot::open(&config.data_dir)?),
        StorageMode::Sqlite => Box::new(SqlSlot::local(&config.database_path)?),
        StorageMode::Turso => {
            // Presence is checked by Config::validate.
            let url = config.turso_url.as_deref().unwrap_or_default();
            let token = config.turso_token.as_deref().unwrap_or_default();
            Box::new(SqlSlot::turso(url, token)?)
        }
        StorageMode::Memory => Box::new(MemorySlot::new()),
    };
    Ok(slot)
}

/// Default mode. Serves the JSON API.
fn run_web(catalog: Catalog, cart: CartStore<DynSlot>, port: u16) -> Result<()> {
    let cart = Arc::new(tokio::sync::Mutex::new(cart));
    let state = AppState::new(catalog, Arc::clone(&cart));

    let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
    rt.block_on(infra::web::start_server(state, port))
        .context("Server failed")?;

    // Runtime first, then the store and whatever runtime its slot owns.
    drop(rt);
    drop(cart);
    Ok(())
}
