//! Courier - Main Entry Point
//!
//! Serves one panel over stdin/stdout. Logs go to stderr.

use std::sync::Arc;

use courier_application::ports::KeyValueStore;
use courier_domain::settings::ClientSettings;
use courier_infrastructure::{InMemoryStore, JsonFileStore, SettingsRepository};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Courier v{}", env!("CARGO_PKG_VERSION"));

    let settings = SettingsRepository::new()
        .load()
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "using default settings");
            ClientSettings::default()
        });

    let store: Arc<dyn KeyValueStore> = match JsonFileStore::open_default().await {
        Ok(store) => {
            info!(path = %store.path().display(), "state file");
            Arc::new(store)
        }
        Err(e) => {
            warn!(error = %e, "state will not be persisted");
            Arc::new(InMemoryStore::new())
        }
    };

    courier::run(store, settings, tokio::io::stdin(), tokio::io::stdout()).await?;

    Ok(())
}
