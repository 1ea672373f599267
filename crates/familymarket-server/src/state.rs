//! Shared application state.

use familymarket_billing::MercadoPagoClient;
use familymarket_core::FamilyMarketConfig;
use familymarket_intent::LlmConfig;
use familymarket_store::StoreBackend;
use parking_lot::RwLock;

/// Shared application state accessible from all route handlers.
/// Everything is constructed once at startup and injected; there are no
/// ambient singletons.
pub struct AppState {
    pub config: FamilyMarketConfig,
    pub store: StoreBackend,
    pub http: reqwest::Client,
    pub llm_config: RwLock<LlmConfig>,
    /// Absent when no MercadoPago access token is configured; checkout
    /// routes answer 503 in that case.
    pub payments: Option<MercadoPagoClient>,
}

impl AppState {
    pub fn new(config: FamilyMarketConfig, store: StoreBackend) -> Self {
        let llm_config = LlmConfig::load(&config.llm_config_file);
        let payments = config
            .billing
            .access_token
            .as_ref()
            .map(|token| MercadoPagoClient::new(token.clone()));

        Self {
            config,
            store,
            http: reqwest::Client::new(),
            llm_config: RwLock::new(llm_config),
            payments,
        }
    }
}
