//! Subscription billing routes — checkout, webhook intake, activation.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::state::AppState;
use familymarket_billing::{ActivationPoller, WebhookNotification};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/payments/checkout", post(create_checkout))
        .route("/payments/webhook", post(webhook))
        .route("/payments/confirm", post(confirm))
}

// ---------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------

#[derive(Deserialize)]
struct CheckoutRequest {
    #[serde(rename = "userId", default)]
    user_id: String,
}

async fn create_checkout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckoutRequest>,
) -> impl IntoResponse {
    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "userId es requerido" })),
        );
    }

    let Some(payments) = &state.payments else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": "Pagos no configurados" })),
        );
    };

    match payments
        .create_preference(
            "Suscripción de tienda Family Market",
            state.config.billing.subscription_price,
            user_id,
        )
        .await
    {
        Ok(preference) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "preferenceId": preference.id,
                "url": preference.init_point,
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "No se pudo crear el checkout",
                "details": e.to_string(),
            })),
        ),
    }
}

// ---------------------------------------------------------------
// Webhook
// ---------------------------------------------------------------

/// Notification intake. Always acknowledged with 200 so the provider
/// stops retrying; failures only get logged.
async fn webhook(
    State(state): State<Arc<AppState>>,
    Json(notification): Json<WebhookNotification>,
) -> Json<serde_json::Value> {
    let Some(payment_id) = notification
        .is_payment()
        .then(|| notification.payment_id())
        .flatten()
    else {
        return Json(serde_json::json!({ "received": true, "ignored": true }));
    };

    let Some(payments) = &state.payments else {
        warn!("Webhook for payment {payment_id} received without payment credentials");
        return Json(serde_json::json!({ "received": true }));
    };

    match payments.get_payment(&payment_id).await {
        Ok(payment) if payment.is_approved() => {
            if let Some(user_id) = payment.external_reference.as_deref() {
                match state.store.set_subscription_status(user_id, "activa").await {
                    Ok(()) => info!("Webhook activated subscription for {user_id}"),
                    Err(e) => warn!("Webhook activation write failed for {user_id}: {e}"),
                }
            } else {
                warn!("Approved payment {payment_id} carried no external reference");
            }
        }
        Ok(payment) => {
            info!("Payment {payment_id} not approved (status={})", payment.status);
        }
        Err(e) => warn!("Payment {payment_id} lookup failed: {e}"),
    }

    Json(serde_json::json!({ "received": true }))
}

// ---------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------

#[derive(Deserialize)]
struct ConfirmRequest {
    #[serde(rename = "userId", default)]
    user_id: String,
    #[serde(rename = "paymentId", default)]
    payment_id: String,
    #[serde(default)]
    status: Option<String>,
}

/// Post-checkout confirmation. Without payment parameters and a user id
/// this rejects before touching the store; otherwise it waits for the
/// webhook-driven activation and reconciles manually on timeout.
async fn confirm(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConfirmRequest>,
) -> impl IntoResponse {
    let user_id = req.user_id.trim();
    let payment_id = req.payment_id.trim();

    if user_id.is_empty() || payment_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Pago no verificado" })),
        );
    }
    if let Some(status) = req.status.as_deref() {
        if status != "approved" {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "Pago no aprobado" })),
            );
        }
    }

    let poller = ActivationPoller::from_settings(&state.config.billing);
    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let outcome = poller
        .await_activation(&state.store, user_id, cancel_rx)
        .await;

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "id": outcome.id,
            "state": outcome.state,
            "attempts": outcome.attempts_used,
        })),
    )
}
