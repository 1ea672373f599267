//! Query intent classification.
//!
//! One completion round-trip per query. Any failure — no provider
//! configured, transport error, unparseable reply — degrades to the
//! permissive fallback analysis; the search itself never aborts.

use familymarket_core::{Error, Result};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::providers;
use crate::types::{ChatMessage, IntentAnalysis};

const CLASSIFIER_TEMPERATURE: f64 = 0.2;
const CLASSIFIER_MAX_TOKENS: usize = 400;

const CLASSIFIER_PROMPT: &str = "\
Sos el clasificador de búsquedas de Family Market, un mercado comunitario \
con tres colecciones: productos, servicios y empleos. Analizá la consulta \
del usuario y respondé ÚNICAMENTE un objeto JSON con esta forma:
{
  \"intencion\": \"etiqueta corta de la intención\",
  \"tipo_busqueda\": [\"productos\" | \"servicios\" | \"empleos\"],
  \"palabras_clave\": [\"términos relevantes, singular y plural\"],
  \"categorias_productos\": [\"categorías sugeridas en snake_case\"],
  \"categorias_servicios\": [\"categorías sugeridas en snake_case\"],
  \"categorias_empleos\": [\"categorías sugeridas en snake_case\"]
}
Incluí en tipo_busqueda solo las colecciones que correspondan a la consulta. \
No agregues texto fuera del JSON.";

/// Classify a free-text query, falling back to [`IntentAnalysis::fallback`]
/// on any failure.
pub async fn classify_intent(client: &Client, config: &LlmConfig, query: &str) -> IntentAnalysis {
    match try_classify(client, config, query).await {
        Ok(analysis) => {
            debug!(
                "Classified query: intencion={}, targets={:?}",
                analysis.intencion,
                analysis.target_names()
            );
            analysis
        }
        Err(e) => {
            warn!("Intent classification failed, using fallback analysis: {e}");
            IntentAnalysis::fallback()
        }
    }
}

async fn try_classify(client: &Client, config: &LlmConfig, query: &str) -> Result<IntentAnalysis> {
    let (provider, model, api_key) = config
        .resolve_provider()
        .ok_or_else(|| Error::Classifier("No LLM provider configured".into()))?;

    let messages = vec![
        ChatMessage::system(CLASSIFIER_PROMPT),
        ChatMessage::user(query),
    ];

    let raw = providers::complete(
        client,
        provider,
        messages,
        &model,
        &api_key,
        CLASSIFIER_TEMPERATURE,
        CLASSIFIER_MAX_TOKENS,
    )
    .await?;

    parse_analysis(&raw)
}

/// Parse the model reply, tolerating markdown fences and prose around
/// the JSON object.
pub fn parse_analysis(raw: &str) -> Result<IntentAnalysis> {
    let start = raw
        .find('{')
        .ok_or_else(|| Error::Classifier("Reply carried no JSON object".into()))?;
    let end = raw
        .rfind('}')
        .ok_or_else(|| Error::Classifier("Reply carried no JSON object".into()))?;
    if end < start {
        return Err(Error::Classifier("Reply carried no JSON object".into()));
    }

    serde_json::from_str(&raw[start..=end])
        .map_err(|e| Error::Classifier(format!("Unparseable analysis: {e}")))
}
