//! Persisted row types.

use serde::{Deserialize, Serialize};

/// An uploaded PDF document. Created on upload, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    /// Storage path of the uploaded file; opaque outside the renderer.
    pub path: String,
    pub pages: u32,
    /// Unix millis.
    pub created_at: i64,
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// One entry in the chat transcript. Two are appended per successful ask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub doc_id: Option<String>,
    pub role: Role,
    pub content: String,
    /// Unix millis.
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_display() {
        assert_eq!(Role::User.to_string().parse::<Role>().unwrap(), Role::User);
        assert_eq!(
            Role::Assistant.to_string().parse::<Role>().unwrap(),
            Role::Assistant
        );
        assert!("system".parse::<Role>().is_err());
    }
}
