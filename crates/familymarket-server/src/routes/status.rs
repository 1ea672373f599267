//! Service status route.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(get_status))
}

/// GET /api/status — service health and effective limits.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let llm_available = state.llm_config.read().resolve_provider().is_some();

    Json(serde_json::json!({
        "status": "healthy",
        "service": "familymarket-rs",
        "llmAvailable": llm_available,
        "paymentsConfigured": state.payments.is_some(),
        "limits": {
            "fetchWindow": state.config.search.fetch_window,
            "searchCap": state.config.search.search_cap,
            "chatCap": state.config.search.chat_cap,
        },
    }))
}
