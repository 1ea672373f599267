//! Chat assistant routes — Mily, the marketplace search assistant.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::state::AppState;
use familymarket_intent::{generate_reply, providers, ChatTurn, LlmConfigUpdate, TestKeyRequest};
use familymarket_search::run_search;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat-mily", post(chat))
        .route("/chat-mily/status", get(get_status))
        .route("/chat-mily/config", get(get_config).put(update_config))
        .route("/chat-mily/config/test", post(test_key))
}

// ---------------------------------------------------------------
// Chat
// ---------------------------------------------------------------

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
    #[serde(rename = "conversationHistory", default)]
    conversation_history: Vec<ChatTurn>,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let message = req.message.trim();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Mensaje inválido" })),
        );
    }

    let llm = { state.llm_config.read().clone() };

    let outcome = run_search(
        &state.store,
        &state.http,
        &llm,
        &state.config.search,
        message,
        state.config.search.chat_cap,
    )
    .await;

    let results = outcome.tagged_results();
    let reply = generate_reply(
        &state.http,
        &llm,
        message,
        &req.conversation_history,
        results.len(),
    )
    .await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "response": reply,
            "results": results,
            "analysis": {
                "intencion": outcome.analysis.intencion,
                "tipo_busqueda": outcome.analysis.target_names(),
            },
        })),
    )
}

// ---------------------------------------------------------------
// Status
// ---------------------------------------------------------------

async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let config = state.llm_config.read();
    let resolved = config.resolve_provider();

    Json(serde_json::json!({
        "llmAvailable": resolved.is_some(),
        "llmProvider": resolved.as_ref().map(|(p, _, _)| p.to_string()),
        "defaultModel": resolved.as_ref().map(|(_, m, _)| m.clone()),
        "availableModels": config.available_models(),
    }))
}

// ---------------------------------------------------------------
// Config
// ---------------------------------------------------------------

async fn get_config(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let config = state.llm_config.read();
    Json(serde_json::to_value(config.to_response()).unwrap_or_default())
}

async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<LlmConfigUpdate>,
) -> impl IntoResponse {
    let mut config = state.llm_config.write();
    config.apply_update(&update);

    if let Err(e) = config.save() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "No se pudo guardar la configuración",
                "details": e.to_string(),
            })),
        );
    }

    (
        StatusCode::OK,
        Json(serde_json::to_value(config.to_response()).unwrap_or_default()),
    )
}

async fn test_key(Json(req): Json<TestKeyRequest>) -> impl IntoResponse {
    match providers::test_api_key(&req.provider, &req.api_key).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        ),
        Err(e) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": false, "error": e })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{json_body, test_state};
    use familymarket_intent::NO_RESULTS_REPLY;
    use familymarket_store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_blank_message_rejected() {
        let state = test_state(MemoryStore::new());
        let response = chat(
            State(state),
            Json(ChatRequest {
                message: "".into(),
                conversation_history: Vec::new(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Mensaje inválido");
    }

    // A query matching nothing answers the designated no-results line
    // with an empty (never absent) result list.
    #[tokio::test]
    async fn test_no_match_uses_fallback_reply() {
        let store = MemoryStore::new();
        store.insert(
            "productos",
            "p1",
            json!({ "nombre": "Torta de Chocolate Artesanal", "estado": "disponible" }),
        );
        let state = test_state(store);

        let response = chat(
            State(state),
            Json(ChatRequest {
                message: "xyz-no-match-000".into(),
                conversation_history: Vec::new(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["response"], NO_RESULTS_REPLY);
        assert!(body["results"].as_array().unwrap().is_empty());
        assert_eq!(
            body["analysis"]["tipo_busqueda"],
            json!(["productos", "servicios", "empleos"])
        );
    }

    #[tokio::test]
    async fn test_match_carries_tagged_results() {
        let store = MemoryStore::new();
        store.insert(
            "productos",
            "p1",
            json!({ "nombre": "Torta de Chocolate Artesanal", "estado": "disponible" }),
        );
        let state = test_state(store);

        let response = chat(
            State(state),
            Json(ChatRequest {
                message: "torta chocolate".into(),
                conversation_history: Vec::new(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["type"], "producto");
        assert!(body["response"].is_string());
    }
}
