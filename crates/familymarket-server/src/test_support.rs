//! Shared fixtures for route handler tests.

use std::sync::Arc;

use familymarket_core::{BillingSettings, FamilyMarketConfig, FirestoreSettings, SearchLimits};
use familymarket_store::{MemoryStore, StoreBackend};

use crate::state::AppState;

/// Build an AppState around an in-memory store. The LLM config is pinned
/// to an unresolvable provider so handlers deterministically take their
/// fallback paths instead of calling out.
pub fn test_state(store: MemoryStore) -> Arc<AppState> {
    let dir = tempfile::tempdir().unwrap();
    let llm_config_file = dir.path().join("llm-config.json");
    std::fs::write(&llm_config_file, r#"{ "preferred_provider": "none" }"#).unwrap();

    let config = FamilyMarketConfig {
        port: 0,
        llm_config_file,
        firestore: FirestoreSettings {
            project_id: "test".into(),
            base_url: "http://127.0.0.1:1".into(),
            api_key: None,
        },
        search: SearchLimits::default(),
        billing: BillingSettings {
            access_token: None,
            subscription_price: 5000.0,
            poll_attempts: 2,
            poll_interval_secs: 1,
        },
    };

    Arc::new(AppState::new(config, StoreBackend::Memory(store)))
}

pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
