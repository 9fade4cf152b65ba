//! Document routes — upload, lookup, page text, chat transcript.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use margin_core::Error;
use margin_store::Document;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(upload_pdf))
        .route("/documents/{doc_id}", get(get_document))
        .route("/documents/{doc_id}/page/{page}/text", get(get_page_text))
        .route("/documents/{doc_id}/chat", get(get_chat))
}

/// POST /api/upload — store a PDF and register it with its page count.
async fn upload_pdf(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::Validation(format!("invalid multipart body: {e}")))?;
        file = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) =
        file.ok_or_else(|| Error::Validation("multipart field 'file' required".to_string()))?;

    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(Error::Validation("Only PDF files supported".to_string()).into());
    }

    // Path separators in the client-supplied name must not escape the pdf dir.
    let safe_name = filename.replace(['/', '\\'], "_");
    let doc_id = format!("doc_{}", margin_resolve::short_id());
    let pdf_path = state.config.data_paths.pdfs.join(format!("{doc_id}_{safe_name}"));
    tokio::fs::write(&pdf_path, &bytes).await.map_err(Error::Io)?;

    let pages = {
        let state = state.clone();
        let pdf_path = pdf_path.clone();
        tokio::task::spawn_blocking(move || state.renderer.page_count(&pdf_path))
            .await
            .map_err(|e| Error::Internal(format!("page count task panicked: {e}")))??
    };

    let doc = Document {
        id: doc_id,
        filename: safe_name,
        path: pdf_path.to_string_lossy().to_string(),
        pages,
        created_at: chrono::Utc::now().timestamp_millis(),
    };
    state.store.insert_document(&doc)?;

    info!(doc_id = %doc.id, pages, "uploaded document");

    Ok(Json(json!({
        "doc_id": doc.id,
        "filename": doc.filename,
        "pages": doc.pages,
    })))
}

/// GET /api/documents/{doc_id}
async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(doc_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let doc = lookup_document(&state, &doc_id)?;
    Ok(Json(json!({
        "id": doc.id,
        "filename": doc.filename,
        "pages": doc.pages,
    })))
}

/// GET /api/documents/{doc_id}/page/{page}/text
async fn get_page_text(
    State(state): State<Arc<AppState>>,
    Path((doc_id, page)): Path<(String, u32)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let doc = lookup_document(&state, &doc_id)?;
    if page < 1 || page > doc.pages {
        return Err(Error::InvalidPage {
            page,
            pages: doc.pages,
        }
        .into());
    }

    let text = {
        let state = state.clone();
        let pdf_path = std::path::PathBuf::from(&doc.path);
        tokio::task::spawn_blocking(move || state.renderer.page_text(&pdf_path, page))
            .await
            .map_err(|e| Error::Internal(format!("page text task panicked: {e}")))??
    };

    Ok(Json(json!({
        "doc_id": doc_id,
        "page": page,
        "text": text,
    })))
}

/// GET /api/documents/{doc_id}/chat — transcript, oldest first.
async fn get_chat(
    State(state): State<Arc<AppState>>,
    Path(doc_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    lookup_document(&state, &doc_id)?;
    let messages = state.store.list_chat(&doc_id)?;
    Ok(Json(json!({
        "total": messages.len(),
        "messages": messages,
    })))
}

pub(crate) fn lookup_document(state: &AppState, doc_id: &str) -> Result<Document, ApiError> {
    state
        .store
        .get_document(doc_id)?
        .ok_or_else(|| Error::NotFound("Document not found".to_string()).into())
}
