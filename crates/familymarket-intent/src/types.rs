//! Intent analysis and LLM configuration types.

use familymarket_store::ListingKind;
use serde::{Deserialize, Deserializer, Serialize};

/// LLM provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAI,
    Anthropic,
    Groq,
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::OpenAI => write!(f, "openai"),
            LlmProvider::Anthropic => write!(f, "anthropic"),
            LlmProvider::Groq => write!(f, "groq"),
        }
    }
}

/// Message sent to a completion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".into(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".into(), content: content.into() }
    }
}

/// One turn of the assistant conversation as the client sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    /// `"user"` or `"bot"`.
    #[serde(rename = "type", default)]
    pub sender: String,
    #[serde(default)]
    pub text: String,
}

/// Structured output of the query classifier. Transient — built per
/// request, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntentAnalysis {
    #[serde(default)]
    pub intencion: String,
    #[serde(default, deserialize_with = "lenient_kinds")]
    pub tipo_busqueda: Vec<ListingKind>,
    #[serde(default)]
    pub palabras_clave: Vec<String>,
    #[serde(default)]
    pub categorias_productos: Vec<String>,
    #[serde(default)]
    pub categorias_servicios: Vec<String>,
    #[serde(default)]
    pub categorias_empleos: Vec<String>,
}

impl IntentAnalysis {
    /// Permissive default used when the classifier fails: search every
    /// collection by raw terms only.
    pub fn fallback() -> Self {
        Self {
            intencion: "busqueda_general".into(),
            tipo_busqueda: Vec::new(),
            palabras_clave: Vec::new(),
            categorias_productos: Vec::new(),
            categorias_servicios: Vec::new(),
            categorias_empleos: Vec::new(),
        }
    }

    /// Collections to search. An empty classification means no
    /// restriction, i.e. all three.
    pub fn targets(&self) -> Vec<ListingKind> {
        if self.tipo_busqueda.is_empty() {
            ListingKind::ALL.to_vec()
        } else {
            self.tipo_busqueda.clone()
        }
    }

    /// Suggested category labels for one collection.
    pub fn categories_for(&self, kind: ListingKind) -> &[String] {
        match kind {
            ListingKind::Producto => &self.categorias_productos,
            ListingKind::Servicio => &self.categorias_servicios,
            ListingKind::Empleo => &self.categorias_empleos,
        }
    }

    /// Serialized target list (`["productos", ...]`) for responses.
    pub fn target_names(&self) -> Vec<&'static str> {
        self.targets().iter().map(|k| k.collection()).collect()
    }
}

/// Classifier output arrives from a language model; unknown collection
/// names are dropped instead of failing the whole parse.
fn lenient_kinds<'de, D>(deserializer: D) -> Result<Vec<ListingKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let names: Vec<String> = Vec::deserialize(deserializer).unwrap_or_default();
    Ok(names
        .iter()
        .filter_map(|n| ListingKind::from_collection(n.trim()))
        .collect())
}

/// LLM config response (keys masked).
#[derive(Debug, Clone, Serialize)]
pub struct LlmConfigResponse {
    #[serde(rename = "preferredProvider")]
    pub preferred_provider: String,
    #[serde(rename = "openaiConfigured")]
    pub openai_configured: bool,
    #[serde(rename = "anthropicConfigured")]
    pub anthropic_configured: bool,
    #[serde(rename = "groqConfigured")]
    pub groq_configured: bool,
    #[serde(rename = "openaiModel")]
    pub openai_model: String,
    #[serde(rename = "anthropicModel")]
    pub anthropic_model: String,
    #[serde(rename = "groqModel")]
    pub groq_model: String,
    #[serde(rename = "activeProvider")]
    pub active_provider: Option<String>,
}

/// LLM config update request.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfigUpdate {
    #[serde(rename = "preferredProvider")]
    pub preferred_provider: Option<String>,
    #[serde(rename = "openaiApiKey")]
    pub openai_api_key: Option<String>,
    #[serde(rename = "anthropicApiKey")]
    pub anthropic_api_key: Option<String>,
    #[serde(rename = "groqApiKey")]
    pub groq_api_key: Option<String>,
    #[serde(rename = "openaiModel")]
    pub openai_model: Option<String>,
    #[serde(rename = "anthropicModel")]
    pub anthropic_model: Option<String>,
    #[serde(rename = "groqModel")]
    pub groq_model: Option<String>,
}

/// API key test request.
#[derive(Debug, Clone, Deserialize)]
pub struct TestKeyRequest {
    pub provider: String,
    #[serde(rename = "apiKey")]
    pub api_key: String,
}
