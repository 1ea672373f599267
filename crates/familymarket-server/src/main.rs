//! Family Market — search and billing backend for the community marketplace.

use std::path::PathBuf;
use std::sync::Arc;

use familymarket_store::{FirestoreClient, StoreBackend};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod state;
#[cfg(test)]
mod test_support;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("FAMILYMARKET_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    // Initialize configuration
    let config = familymarket_core::FamilyMarketConfig::from_env(&data_dir)?;
    let port = config.port;

    // Initialize the document store client
    let store = StoreBackend::Firestore(FirestoreClient::new(config.firestore.clone()));

    // Build application state
    let state = Arc::new(AppState::new(config, store));

    // Build router
    let app = routes::build_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Family Market server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
