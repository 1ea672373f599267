//! External LLM provider calls.
//!
//! Both marketplace flows (classification, assistant reply) are single
//! blocking round-trips; OpenAI and Groq share a request format,
//! Anthropic uses its Messages API.

use familymarket_core::{Error, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::types::{ChatMessage, LlmProvider};

/// Request one non-streaming completion from the given provider and
/// return the assistant text.
pub async fn complete(
    client: &Client,
    provider: LlmProvider,
    messages: Vec<ChatMessage>,
    model: &str,
    api_key: &str,
    temperature: f64,
    max_tokens: usize,
) -> Result<String> {
    match provider {
        LlmProvider::OpenAI => {
            complete_openai_compat(
                client,
                "https://api.openai.com/v1/chat/completions",
                messages,
                model,
                api_key,
                temperature,
                max_tokens,
            )
            .await
        }
        LlmProvider::Groq => {
            complete_openai_compat(
                client,
                "https://api.groq.com/openai/v1/chat/completions",
                messages,
                model,
                api_key,
                temperature,
                max_tokens,
            )
            .await
        }
        LlmProvider::Anthropic => {
            complete_anthropic(client, messages, model, api_key, temperature, max_tokens).await
        }
    }
}

/// OpenAI-compatible APIs (OpenAI, Groq).
async fn complete_openai_compat(
    client: &Client,
    url: &str,
    messages: Vec<ChatMessage>,
    model: &str,
    api_key: &str,
    temperature: f64,
    max_tokens: usize,
) -> Result<String> {
    let msgs: Vec<Value> = messages
        .iter()
        .map(|m| json!({ "role": m.role, "content": m.content }))
        .collect();

    let body = json!({
        "model": model,
        "messages": msgs,
        "temperature": temperature,
        "max_tokens": max_tokens,
    });

    debug!("Completing via {} with model {}", url, model);

    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {api_key}"))
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| Error::Completion(format!("Request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Completion(format!("API error {status}: {body}")));
    }

    let parsed: Value = response
        .json()
        .await
        .map_err(|e| Error::Completion(format!("Response decode failed: {e}")))?;

    parsed["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::Completion("Response carried no message content".into()))
}

/// Anthropic's Messages API.
async fn complete_anthropic(
    client: &Client,
    messages: Vec<ChatMessage>,
    model: &str,
    api_key: &str,
    temperature: f64,
    max_tokens: usize,
) -> Result<String> {
    // Separate system message from conversation
    let system_msg: Option<String> = messages
        .iter()
        .find(|m| m.role == "system")
        .map(|m| m.content.clone());

    let conv_msgs: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != "system")
        .map(|m| json!({ "role": m.role, "content": m.content }))
        .collect();

    let mut body = json!({
        "model": model,
        "messages": conv_msgs,
        "temperature": temperature,
        "max_tokens": max_tokens,
    });

    if let Some(sys) = system_msg {
        body["system"] = json!(sys);
    }

    debug!("Completing via Anthropic with model {}", model);

    let response = client
        .post("https://api.anthropic.com/v1/messages")
        .header("x-api-key", api_key)
        .header("anthropic-version", "2023-06-01")
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| Error::Completion(format!("Request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Completion(format!("API error {status}: {body}")));
    }

    let parsed: Value = response
        .json()
        .await
        .map_err(|e| Error::Completion(format!("Response decode failed: {e}")))?;

    parsed["content"][0]["text"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::Completion("Response carried no text block".into()))
}

/// Test an API key by making a minimal request.
pub async fn test_api_key(provider: &str, api_key: &str) -> std::result::Result<(), String> {
    let client = Client::new();

    match provider {
        "openai" => {
            let resp = client
                .get("https://api.openai.com/v1/models")
                .header("Authorization", format!("Bearer {api_key}"))
                .send()
                .await
                .map_err(|e| e.to_string())?;
            if resp.status().is_success() {
                Ok(())
            } else {
                Err(format!("API returned status {}", resp.status()))
            }
        }
        "anthropic" => {
            let resp = client
                .post("https://api.anthropic.com/v1/messages")
                .header("x-api-key", api_key)
                .header("anthropic-version", "2023-06-01")
                .header("Content-Type", "application/json")
                .json(&json!({
                    "model": "claude-3-5-haiku-20241022",
                    "max_tokens": 1,
                    "messages": [{"role": "user", "content": "Hi"}],
                }))
                .send()
                .await
                .map_err(|e| e.to_string())?;
            // 400 with valid key means key works (may be quota/model issue)
            if resp.status().is_success() || resp.status().as_u16() == 400 {
                Ok(())
            } else {
                Err(format!("API returned status {}", resp.status()))
            }
        }
        "groq" => {
            let resp = client
                .get("https://api.groq.com/openai/v1/models")
                .header("Authorization", format!("Bearer {api_key}"))
                .send()
                .await
                .map_err(|e| e.to_string())?;
            if resp.status().is_success() {
                Ok(())
            } else {
                Err(format!("API returned status {}", resp.status()))
            }
        }
        _ => Err(format!("Unknown provider: {provider}")),
    }
}
