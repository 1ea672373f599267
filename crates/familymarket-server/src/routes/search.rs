//! Smart search route — intent-guided search across the three listing
//! collections.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::state::AppState;
use familymarket_search::run_search;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/smart-search", post(smart_search))
}

#[derive(Deserialize)]
struct SmartSearchRequest {
    #[serde(rename = "searchQuery", default)]
    search_query: String,
}

async fn smart_search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SmartSearchRequest>,
) -> impl IntoResponse {
    let query = req.search_query.trim();
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "searchQuery es requerido" })),
        );
    }

    let llm = { state.llm_config.read().clone() };

    let outcome = run_search(
        &state.store,
        &state.http,
        &llm,
        &state.config.search,
        query,
        state.config.search.search_cap,
    )
    .await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "analysis": outcome.analysis,
            "productos": outcome.productos,
            "servicios": outcome.servicios,
            "empleos": outcome.empleos,
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{json_body, test_state};
    use axum::response::IntoResponse;
    use familymarket_store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let state = test_state(MemoryStore::new());
        let response = smart_search(
            State(state),
            Json(SmartSearchRequest {
                search_query: "   ".into(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "searchQuery es requerido");
    }

    // Classifier unavailable: raw-term matching still answers with all
    // three arrays present and an empty keyword set.
    #[tokio::test]
    async fn test_search_degrades_without_classifier() {
        let store = MemoryStore::new();
        store.insert(
            "productos",
            "p1",
            json!({ "nombre": "Torta de Chocolate Artesanal", "estado": "disponible" }),
        );
        store.insert(
            "productos",
            "p2",
            json!({ "nombre": "Torta de chocolate y frutilla", "estado": "agotado" }),
        );
        let state = test_state(store);

        let response = smart_search(
            State(state),
            Json(SmartSearchRequest {
                search_query: "torta chocolate".into(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["productos"].as_array().unwrap().len(), 1);
        assert_eq!(body["productos"][0]["titulo"], "Torta de Chocolate Artesanal");
        assert!(body["servicios"].as_array().unwrap().is_empty());
        assert!(body["empleos"].as_array().unwrap().is_empty());
        assert!(body["analysis"]["palabras_clave"]
            .as_array()
            .unwrap()
            .is_empty());
    }
}
