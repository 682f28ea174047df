//! Community event board: organizations host events, volunteers sign up to
//! attend them.
//!
//! Pages are served as JSON view models over form-encoded POSTs; the session
//! is a signed cookie resolved per request by [`auth::Identity`].

use std::sync::Arc;

use tokio::signal::{self, ctrl_c};
use tracing::{info, warn};

pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
pub mod views;

use config::{Config, StoreBackend};
use state::AppState;
use store::{MemoryStore, PgStore, Store};
use utils::error::AppResult;

pub async fn build_state(config: &Config) -> AppResult<AppState> {
    let store: Arc<dyn Store> = match &config.store {
        StoreBackend::Postgres(url) => Arc::new(PgStore::connect(url).await?),
        StoreBackend::Memory => {
            warn!("Using the in-memory store, data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(AppState::new(store, config))
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
