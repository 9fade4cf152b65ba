//! SQLite store for document metadata and chat transcripts.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use crate::schema::SCHEMA_SQL;
use crate::types::{ChatMessage, Document, Role};
use margin_core::{Error, Result};

/// SQLite-backed store. All writes are inserts; nothing is updated in place.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open or create the store. `db_dir` is the directory; the file will be
    /// `db_dir/margin.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Storage(e.to_string()))?;
        let db_path = db_dir.join("margin.db");

        let conn = Connection::open(&db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("schema init failed: {e}")))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        info!(
            "SqliteStore initialized: {} documents, path={}",
            store.count_documents()?,
            store.db_path.display()
        );

        Ok(store)
    }

    // ---------------------------------------------------------------
    // Documents
    // ---------------------------------------------------------------

    pub fn insert_document(&self, doc: &Document) -> Result<()> {
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO documents (id, filename, path, pages, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            doc.id,
            doc.filename,
            doc.path,
            doc.pages,
            doc.created_at
        ])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    pub fn get_document(&self, doc_id: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT id, filename, path, pages, created_at FROM documents WHERE id = ?1",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        stmt.query_row(params![doc_id], row_to_document)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub fn count_documents(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))
    }

    // ---------------------------------------------------------------
    // Chat transcript
    // ---------------------------------------------------------------

    pub fn insert_chat(&self, msg: &ChatMessage) -> Result<()> {
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO chat_messages (id, doc_id, role, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            msg.id,
            msg.doc_id,
            msg.role.to_string(),
            msg.content,
            msg.created_at
        ])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Transcript for one document, oldest first; insertion order breaks
    /// timestamp ties so the user message of an ask always precedes its
    /// answer.
    pub fn list_chat(&self, doc_id: &str) -> Result<Vec<ChatMessage>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT id, doc_id, role, content, created_at FROM chat_messages
                 WHERE doc_id = ?1 ORDER BY created_at ASC, rowid ASC",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![doc_id], row_to_chat_message)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Database(e.to_string()))
    }
}

fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get(0)?,
        filename: row.get(1)?,
        path: row.get(2)?,
        pages: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn row_to_chat_message(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
    let role: String = row.get(2)?;
    Ok(ChatMessage {
        id: row.get(0)?,
        doc_id: row.get(1)?,
        role: Role::from_str(&role).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                e.into(),
            )
        })?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SqliteStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(tmp.path()).unwrap();
        (tmp, store)
    }

    fn doc(id: &str) -> Document {
        Document {
            id: id.to_string(),
            filename: "sample.pdf".to_string(),
            path: format!("/data/pdfs/{id}_sample.pdf"),
            pages: 2,
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn insert_and_get_document() {
        let (_tmp, store) = store();
        store.insert_document(&doc("doc_abc")).unwrap();

        let found = store.get_document("doc_abc").unwrap().unwrap();
        assert_eq!(found, doc("doc_abc"));
        assert_eq!(store.count_documents().unwrap(), 1);
    }

    #[test]
    fn missing_document_is_none() {
        let (_tmp, store) = store();
        assert!(store.get_document("doc_nope").unwrap().is_none());
    }

    #[test]
    fn duplicate_document_id_is_rejected() {
        let (_tmp, store) = store();
        store.insert_document(&doc("doc_abc")).unwrap();
        assert!(store.insert_document(&doc("doc_abc")).is_err());
    }

    #[test]
    fn chat_messages_come_back_in_insert_order() {
        let (_tmp, store) = store();
        store.insert_document(&doc("doc_abc")).unwrap();

        let ts = 1_700_000_000_000;
        for (i, (role, content)) in [
            (Role::User, "Explain this"),
            (Role::Assistant, "FAKE_TEXT_ANSWER"),
        ]
        .iter()
        .enumerate()
        {
            store
                .insert_chat(&ChatMessage {
                    id: format!("msg_{i}"),
                    doc_id: Some("doc_abc".to_string()),
                    role: *role,
                    content: content.to_string(),
                    // Same timestamp on purpose: rowid must break the tie.
                    created_at: ts,
                })
                .unwrap();
        }

        let transcript = store.list_chat("doc_abc").unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[1].role, Role::Assistant);
        assert_eq!(transcript[1].content, "FAKE_TEXT_ANSWER");
    }

    #[test]
    fn chat_without_document_is_allowed() {
        let (_tmp, store) = store();
        store
            .insert_chat(&ChatMessage {
                id: "msg_x".to_string(),
                doc_id: None,
                role: Role::User,
                content: "standalone question".to_string(),
                created_at: 1,
            })
            .unwrap();
        assert!(store.list_chat("doc_abc").unwrap().is_empty());
    }
}
