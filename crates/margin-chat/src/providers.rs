//! External LLM provider implementations behind [`CompletionBackend`].
//!
//! OpenAI and Groq share the chat-completions format; Anthropic uses its
//! Messages API with a different multimodal block shape. The provider is
//! selected per request from the model name.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use margin_core::{Error, Result};

use crate::backend::CompletionBackend;
use crate::types::{ContentPart, Message, MessageContent};

const ANTHROPIC_MAX_TOKENS: usize = 2048;

/// Known completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Anthropic,
    Groq,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAI => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::Groq => write!(f, "groq"),
        }
    }
}

/// Pick a provider from the model identifier.
pub fn provider_for_model(model: &str) -> Provider {
    const GROQ_PREFIXES: &[&str] = &["llama", "mixtral", "gemma"];

    let model = model.to_ascii_lowercase();
    if model.starts_with("claude") {
        Provider::Anthropic
    } else if GROQ_PREFIXES.iter().any(|p| model.starts_with(p)) {
        Provider::Groq
    } else {
        Provider::OpenAI
    }
}

/// HTTP completion backend routing to OpenAI, Anthropic, or Groq.
pub struct HttpBackend {
    client: Client,
    openai_api_key: Option<String>,
    anthropic_api_key: Option<String>,
    groq_api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(
        openai_api_key: Option<String>,
        anthropic_api_key: Option<String>,
        groq_api_key: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            openai_api_key,
            anthropic_api_key,
            groq_api_key,
        }
    }

    /// Read provider API keys from the environment.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("OPENAI_API_KEY").ok(),
            std::env::var("ANTHROPIC_API_KEY").ok(),
            std::env::var("GROQ_API_KEY").ok(),
        )
    }

    fn key_for(&self, provider: Provider) -> Result<&str> {
        let key = match provider {
            Provider::OpenAI => self.openai_api_key.as_deref(),
            Provider::Anthropic => self.anthropic_api_key.as_deref(),
            Provider::Groq => self.groq_api_key.as_deref(),
        };
        key.ok_or_else(|| Error::Completion(format!("no API key configured for {provider}")))
    }

    async fn complete_openai_compat(
        &self,
        url: &str,
        model: &str,
        messages: &[Message],
        api_key: &str,
    ) -> Result<String> {
        let body = json!({
            "model": model,
            "messages": messages.iter().map(openai_message).collect::<Vec<_>>(),
        });

        debug!("completion request to {} with model {}", url, model);

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Completion(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Completion(format!("API error {status}: {body}")));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Completion(format!("invalid response body: {e}")))?;

        parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(Error::EmptyCompletion)
    }

    async fn complete_anthropic(
        &self,
        model: &str,
        messages: &[Message],
        api_key: &str,
    ) -> Result<String> {
        // Anthropic takes the system instruction out of the message list.
        let system = messages
            .iter()
            .find(|m| m.role == "system")
            .and_then(|m| match &m.content {
                MessageContent::Text(t) => Some(t.clone()),
                MessageContent::Parts(_) => None,
            });

        let conversation: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role != "system")
            .map(anthropic_message)
            .collect();

        let mut body = json!({
            "model": model,
            "messages": conversation,
            "max_tokens": ANTHROPIC_MAX_TOKENS,
        });
        if let Some(system) = system {
            body["system"] = json!(system);
        }

        debug!("completion request to Anthropic with model {}", model);

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Completion(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Completion(format!("API error {status}: {body}")));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Completion(format!("invalid response body: {e}")))?;

        parsed["content"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(Error::EmptyCompletion)
    }
}

#[async_trait]
impl CompletionBackend for HttpBackend {
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String> {
        let provider = provider_for_model(model);
        let api_key = self.key_for(provider)?.to_string();
        match provider {
            Provider::OpenAI => {
                self.complete_openai_compat(
                    "https://api.openai.com/v1/chat/completions",
                    model,
                    messages,
                    &api_key,
                )
                .await
            }
            Provider::Groq => {
                self.complete_openai_compat(
                    "https://api.groq.com/openai/v1/chat/completions",
                    model,
                    messages,
                    &api_key,
                )
                .await
            }
            Provider::Anthropic => self.complete_anthropic(model, messages, &api_key).await,
        }
    }
}

/// Shape a message for OpenAI-compatible APIs. Inline images become
/// `image_url` parts carrying a base64 data URI.
fn openai_message(message: &Message) -> serde_json::Value {
    let content = match &message.content {
        MessageContent::Text(text) => json!(text),
        MessageContent::Parts(parts) => json!(parts
            .iter()
            .map(|part| match part {
                ContentPart::Text { text } => json!({"type": "text", "text": text}),
                ContentPart::Image { data, mime } => json!({
                    "type": "image_url",
                    "image_url": {"url": format!("data:{mime};base64,{data}")},
                }),
            })
            .collect::<Vec<_>>()),
    };
    json!({"role": message.role, "content": content})
}

/// Shape a message for Anthropic's Messages API, which wants raw base64
/// `source` blocks instead of data URIs.
fn anthropic_message(message: &Message) -> serde_json::Value {
    let content = match &message.content {
        MessageContent::Text(text) => json!(text),
        MessageContent::Parts(parts) => json!(parts
            .iter()
            .map(|part| match part {
                ContentPart::Text { text } => json!({"type": "text", "text": text}),
                ContentPart::Image { data, mime } => json!({
                    "type": "image",
                    "source": {"type": "base64", "media_type": mime, "data": data},
                }),
            })
            .collect::<Vec<_>>()),
    };
    json!({"role": message.role, "content": content})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names_route_to_providers() {
        assert_eq!(provider_for_model("gpt-4o-mini"), Provider::OpenAI);
        assert_eq!(provider_for_model("o3-mini"), Provider::OpenAI);
        assert_eq!(
            provider_for_model("claude-3-5-sonnet-20241022"),
            Provider::Anthropic
        );
        assert_eq!(provider_for_model("Claude-3-Haiku"), Provider::Anthropic);
        assert_eq!(provider_for_model("llama-3.3-70b-versatile"), Provider::Groq);
        assert_eq!(provider_for_model("mixtral-8x7b-32768"), Provider::Groq);
    }

    #[test]
    fn openai_text_message_is_plain_string() {
        let msg = Message::user("hello");
        assert_eq!(
            openai_message(&msg),
            json!({"role": "user", "content": "hello"})
        );
    }

    #[test]
    fn openai_multimodal_message_uses_data_uri() {
        let msg = Message::user_parts(vec![
            ContentPart::Text {
                text: "describe".to_string(),
            },
            ContentPart::Image {
                data: "QUJD".to_string(),
                mime: "image/png".to_string(),
            },
        ]);
        let shaped = openai_message(&msg);
        assert_eq!(shaped["content"][0]["type"], "text");
        assert_eq!(shaped["content"][1]["type"], "image_url");
        assert_eq!(
            shaped["content"][1]["image_url"]["url"],
            "data:image/png;base64,QUJD"
        );
    }

    #[test]
    fn anthropic_multimodal_message_uses_base64_source() {
        let msg = Message::user_parts(vec![
            ContentPart::Text {
                text: "describe".to_string(),
            },
            ContentPart::Image {
                data: "QUJD".to_string(),
                mime: "image/png".to_string(),
            },
        ]);
        let shaped = anthropic_message(&msg);
        assert_eq!(shaped["content"][1]["type"], "image");
        assert_eq!(shaped["content"][1]["source"]["media_type"], "image/png");
        assert_eq!(shaped["content"][1]["source"]["data"], "QUJD");
    }

    #[test]
    fn missing_key_is_a_completion_error() {
        let backend = HttpBackend::new(None, None, None);
        let err = backend.key_for(Provider::OpenAI).unwrap_err();
        assert!(matches!(err, Error::Completion(_)));
    }
}
