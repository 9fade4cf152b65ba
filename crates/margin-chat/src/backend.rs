//! Completion backend contract.

use async_trait::async_trait;

use margin_core::Result;

use crate::types::Message;

/// Provider-agnostic completion call: messages in, answer text out.
///
/// Implementations unwrap the first response choice's content and return
/// [`margin_core::Error::EmptyCompletion`] when no choice comes back. No
/// retries, no fallback model.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, model: &str, messages: &[Message]) -> Result<String>;
}
