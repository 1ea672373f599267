//! MercadoPago REST client: checkout preferences and payment lookups.

use familymarket_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

const API_BASE: &str = "https://api.mercadopago.com";

pub struct MercadoPagoClient {
    http: reqwest::Client,
    access_token: String,
    base_url: String,
}

/// A created checkout preference; `init_point` is the buyer redirect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutPreference {
    pub id: String,
    pub init_point: String,
}

/// The slice of a payment we act on.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInfo {
    pub id: u64,
    pub status: String,
    /// Carries the user id the preference was created with.
    pub external_reference: Option<String>,
}

impl PaymentInfo {
    pub fn is_approved(&self) -> bool {
        self.status == "approved"
    }
}

/// Incoming webhook notification body. MercadoPago has sent both the
/// `type`/`data.id` and the older `topic`/`resource` shapes.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookNotification {
    #[serde(default, alias = "topic")]
    pub r#type: Option<String>,
    #[serde(default)]
    pub data: Option<WebhookData>,
    #[serde(default)]
    pub resource: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    pub id: Option<Value>,
}

impl WebhookNotification {
    pub fn is_payment(&self) -> bool {
        matches!(self.r#type.as_deref(), Some("payment"))
    }

    /// Payment id from either notification shape.
    pub fn payment_id(&self) -> Option<String> {
        if let Some(data) = &self.data {
            match &data.id {
                Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
                Some(Value::Number(n)) => return Some(n.to_string()),
                _ => {}
            }
        }
        // Older shape: a resource URL ending in the payment id.
        self.resource
            .as_deref()
            .and_then(|r| r.rsplit('/').next())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }
}

impl MercadoPagoClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token: access_token.into(),
            base_url: API_BASE.into(),
        }
    }

    /// Create a subscription checkout preference for one user.
    pub async fn create_preference(
        &self,
        title: &str,
        price: f64,
        external_reference: &str,
    ) -> Result<CheckoutPreference> {
        let body = json!({
            "items": [{
                "title": title,
                "quantity": 1,
                "currency_id": "ARS",
                "unit_price": price,
            }],
            "external_reference": external_reference,
        });

        debug!("Creating checkout preference for {external_reference}");

        let response = self
            .http
            .post(format!("{}/checkout/preferences", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Payment(format!("Preference request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Payment(format!("MercadoPago {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Payment(format!("Preference decode failed: {e}")))
    }

    /// Look up a payment reported by a webhook notification.
    pub async fn get_payment(&self, payment_id: &str) -> Result<PaymentInfo> {
        let response = self
            .http
            .get(format!("{}/v1/payments/{payment_id}", self.base_url))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| Error::Payment(format!("Payment lookup failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Payment(format!("MercadoPago {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Payment(format!("Payment decode failed: {e}")))
    }
}
