//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Firestore REST connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirestoreSettings {
    /// Google Cloud project id owning the Firestore database.
    pub project_id: String,
    /// API base (`https://firestore.googleapis.com/v1` in production).
    pub base_url: String,
    /// Optional API key appended to every request.
    pub api_key: Option<String>,
}

impl FirestoreSettings {
    /// Root of the `(default)` database's document tree.
    pub fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.base_url.trim_end_matches('/'),
            self.project_id
        )
    }
}

/// Caps applied by the search pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Documents fetched per collection before any filtering.
    pub fetch_window: usize,
    /// Per-collection display cap for `/api/smart-search`.
    pub search_cap: usize,
    /// Per-collection display cap for `/api/chat-mily`.
    pub chat_cap: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            fetch_window: 100,
            search_cap: 10,
            chat_cap: 5,
        }
    }
}

/// MercadoPago and subscription reconciliation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingSettings {
    /// MercadoPago access token. Checkout routes are disabled without it.
    pub access_token: Option<String>,
    /// Monthly store subscription price, in ARS.
    pub subscription_price: f64,
    /// Poll attempts while waiting for the webhook-driven activation.
    pub poll_attempts: u32,
    /// Seconds between poll attempts.
    pub poll_interval_secs: u64,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            access_token: None,
            subscription_price: 5000.0,
            poll_attempts: 10,
            poll_interval_secs: 3,
        }
    }
}

/// Top-level Family Market configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyMarketConfig {
    /// HTTP server port.
    pub port: u16,
    /// LLM configuration file (`<data>/llm-config.json`).
    pub llm_config_file: PathBuf,
    pub firestore: FirestoreSettings,
    pub search: SearchLimits,
    pub billing: BillingSettings,
}

impl FamilyMarketConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(4000);

        let firestore = FirestoreSettings {
            project_id: std::env::var("FIRESTORE_PROJECT_ID")
                .unwrap_or_else(|_| "family-market".into()),
            base_url: std::env::var("FIRESTORE_BASE_URL")
                .unwrap_or_else(|_| "https://firestore.googleapis.com/v1".into()),
            api_key: std::env::var("FIRESTORE_API_KEY").ok(),
        };

        let mut search = SearchLimits::default();
        if let Some(window) = env_usize("SEARCH_FETCH_WINDOW") {
            search.fetch_window = window;
        }

        let mut billing = BillingSettings::default();
        billing.access_token = std::env::var("MP_ACCESS_TOKEN").ok();
        if let Ok(price) = std::env::var("SUBSCRIPTION_PRICE") {
            if let Ok(price) = price.parse() {
                billing.subscription_price = price;
            }
        }
        if let Some(attempts) = env_usize("ACTIVATION_POLL_ATTEMPTS") {
            billing.poll_attempts = attempts as u32;
        }
        if let Some(interval) = env_usize("ACTIVATION_POLL_INTERVAL_SECS") {
            billing.poll_interval_secs = interval as u64;
        }

        Ok(Self {
            port,
            llm_config_file: data_dir.join("llm-config.json"),
            firestore,
            search,
            billing,
        })
    }
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_url() {
        let settings = FirestoreSettings {
            project_id: "feria-test".into(),
            base_url: "https://firestore.googleapis.com/v1/".into(),
            api_key: None,
        };
        assert_eq!(
            settings.documents_url(),
            "https://firestore.googleapis.com/v1/projects/feria-test/databases/(default)/documents"
        );
    }

    #[test]
    fn test_default_limits() {
        let limits = SearchLimits::default();
        assert_eq!(limits.fetch_window, 100);
        assert_eq!(limits.search_cap, 10);
        assert_eq!(limits.chat_cap, 5);
    }
}
