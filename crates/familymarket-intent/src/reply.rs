//! Assistant reply generation.
//!
//! The textual reply is best-effort: the structured result list is
//! returned to the client whether or not this call succeeds.

use reqwest::Client;
use tracing::warn;

use crate::config::LlmConfig;
use crate::providers;
use crate::types::{ChatMessage, ChatTurn};

const REPLY_TEMPERATURE: f64 = 0.7;
const REPLY_MAX_TOKENS: usize = 200;
const HISTORY_WINDOW: usize = 6;

/// Fallback line when generation fails and the search matched nothing.
pub const NO_RESULTS_REPLY: &str =
    "No encontré resultados para tu búsqueda esta vez, pero contame un poco más y seguimos buscando juntos.";

/// Fallback line when generation fails but there are results to show.
pub const RESULTS_REPLY: &str = "¡Encontré estas publicaciones que pueden servirte! Miralas abajo.";

const REPLY_PROMPT: &str = "\
Sos Mily, la asistente de Family Market, un mercado de la comunidad de la \
iglesia. Respondé en castellano rioplatense, con calidez y en dos o tres \
líneas como máximo. Si la búsqueda no encontró resultados, mostrate \
empática y ofrecé seguir buscando; si encontró, presentalos con entusiasmo \
sin inventar detalles. No uses markdown.";

/// Generate the short assistant reply describing the result set.
/// Falls back to a literal line on any failure.
pub async fn generate_reply(
    client: &Client,
    config: &LlmConfig,
    message: &str,
    history: &[ChatTurn],
    result_count: usize,
) -> String {
    let fallback = if result_count == 0 {
        NO_RESULTS_REPLY
    } else {
        RESULTS_REPLY
    };

    let Some((provider, model, api_key)) = config.resolve_provider() else {
        return fallback.to_string();
    };

    let messages = build_messages(message, history, result_count);

    match providers::complete(
        client,
        provider,
        messages,
        &model,
        &api_key,
        REPLY_TEMPERATURE,
        REPLY_MAX_TOKENS,
    )
    .await
    {
        Ok(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
        Ok(_) => fallback.to_string(),
        Err(e) => {
            warn!("Reply generation failed, using fallback line: {e}");
            fallback.to_string()
        }
    }
}

fn build_messages(message: &str, history: &[ChatTurn], result_count: usize) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(format!(
        "{REPLY_PROMPT}\nLa búsqueda actual encontró {result_count} publicaciones."
    ))];

    // Recent turns only; the client resends the whole conversation.
    let recent = history.len().saturating_sub(HISTORY_WINDOW);
    for turn in &history[recent..] {
        if turn.text.trim().is_empty() {
            continue;
        }
        if turn.sender == "user" {
            messages.push(ChatMessage::user(turn.text.clone()));
        } else {
            messages.push(ChatMessage::assistant(turn.text.clone()));
        }
    }

    messages.push(ChatMessage::user(message));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_provider_uses_no_results_line() {
        let client = Client::new();
        let config = LlmConfig::default();
        let reply = generate_reply(&client, &config, "xyz-no-match-000", &[], 0).await;
        assert_eq!(reply, NO_RESULTS_REPLY);
    }

    #[tokio::test]
    async fn test_no_provider_uses_results_line() {
        let client = Client::new();
        let config = LlmConfig::default();
        let reply = generate_reply(&client, &config, "plomero", &[], 3).await;
        assert_eq!(reply, RESULTS_REPLY);
    }

    #[test]
    fn test_history_window_and_roles() {
        let history: Vec<ChatTurn> = (0..10)
            .map(|i| ChatTurn {
                sender: if i % 2 == 0 { "user" } else { "bot" }.into(),
                text: format!("turno {i}"),
            })
            .collect();

        let messages = build_messages("busco tortas", &history, 2);
        // system + 6 recent turns + current message
        assert_eq!(messages.len(), 8);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("2 publicaciones"));
        assert_eq!(messages[1].content, "turno 4");
        assert_eq!(messages.last().unwrap().content, "busco tortas");
        assert_eq!(messages[2].role, "assistant");
    }
}
