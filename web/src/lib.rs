//! # Ticketchain Web
//!
//! HTTP surface for the NFT event ticketing backend: the Axum router, the
//! request handlers, configuration loading, and process assembly.
//!
//! The binary in `src/bin/server.rs` wires a [`config::Config`] into an
//! [`state::AppState`] (ledger store + chain gateway + lifecycle manager +
//! wallet session) and serves [`routes::build_router`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod wallet;

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use ticketchain_core::{ChainGateway, LedgerStore, LifecycleManager};
use ticketchain_gateway::{RelayerConfig, RelayerGateway, SimulatedChain};
use ticketchain_store::{MemoryLedgerStore, PostgresLedgerStore};

pub use config::{Config, StoreBackend};
pub use error::AppError;
pub use routes::build_router;
pub use state::AppState;
pub use wallet::WalletSession;

/// Assemble the application state from configuration.
///
/// # Errors
///
/// Fails if the postgres store cannot be reached or the relayer HTTP
/// client cannot be built.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let store: Arc<dyn LedgerStore> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("using in-memory ledger store with sample events");
            Arc::new(MemoryLedgerStore::with_sample_events())
        }
        StoreBackend::Postgres => {
            tracing::info!(url = %config.store.database_url, "connecting to postgres ledger store");
            let store = PostgresLedgerStore::connect(
                &config.store.database_url,
                config.store.max_connections,
            )
            .await
            .context("failed to connect to postgres")?;
            store
                .seed_sample_events()
                .await
                .context("failed to seed sample events")?;
            Arc::new(store)
        }
    };

    let chain: Arc<dyn ChainGateway> = match &config.chain.relayer_url {
        Some(url) => {
            tracing::info!(relayer = %url, "using relayer chain gateway");
            Arc::new(
                RelayerGateway::new(&RelayerConfig {
                    base_url: url.clone(),
                    contract_address: config.chain.contract_address.clone(),
                    timeout: Duration::from_secs(config.chain.request_timeout),
                })
                .context("failed to build relayer client")?,
            )
        }
        None => {
            tracing::info!("no relayer configured; using simulated chain");
            Arc::new(SimulatedChain::new())
        }
    };

    let manager = Arc::new(LifecycleManager::new(
        store,
        Arc::clone(&chain),
        config.chain.contract_address.clone(),
    ));
    let wallet = Arc::new(WalletSession::new(chain));

    Ok(AppState::new(manager, wallet))
}
