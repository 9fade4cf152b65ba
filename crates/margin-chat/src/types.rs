//! Chat and prompt types shared across providers.

use serde::{Deserialize, Serialize};

/// Summary of the context material a prompt was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UsedContext {
    Text { page: u32, chars: usize },
    Image { page: u32 },
}

/// Structured prompt, independent of the target model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptPlan {
    pub system: String,
    pub user: String,
    pub used_context: UsedContext,
}

/// One part of a multimodal user message.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text { text: String },
    /// Inline image, base64-encoded. Each provider shapes this its own way.
    Image { data: String, mime: String },
}

/// Message content: plain text or an ordered sequence of parts.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A single chat message handed to the completion backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Parts(parts),
        }
    }

    /// Whether this message carries an inline image.
    pub fn is_multimodal(&self) -> bool {
        matches!(
            &self.content,
            MessageContent::Parts(parts)
                if parts.iter().any(|p| matches!(p, ContentPart::Image { .. }))
        )
    }
}
