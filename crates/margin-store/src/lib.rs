//! Margin Store — SQLite persistence for documents and chat transcripts.

pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteStore;
pub use types::{ChatMessage, Document, Role};
