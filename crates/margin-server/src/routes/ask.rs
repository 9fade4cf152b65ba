//! The ask route — selection → context → prompt → completion → transcript.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::ApiError;
use crate::routes::documents::lookup_document;
use crate::state::AppState;
use margin_chat::{build_prompt, dispatch};
use margin_core::{Error, Selection};
use margin_resolve::{short_id, ResolvedContext};
use margin_store::{ChatMessage, Role};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/ask", post(ask))
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub user_query: String,
    pub selection: Selection,
    #[serde(default)]
    pub document_id: Option<String>,
}

/// POST /api/ask
async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // A named document must exist, and the selection's page must be inside it.
    let doc = match &req.document_id {
        Some(doc_id) => Some(lookup_document(&state, doc_id)?),
        None => None,
    };
    if let Some(doc) = &doc {
        let page = req.selection.page();
        if page < 1 || page > doc.pages {
            return Err(Error::InvalidPage {
                page,
                pages: doc.pages,
            }
            .into());
        }
    }

    // Resolve the selection into context material. Rendering and cropping are
    // CPU-bound pdfium work, so resolution runs off the async workers.
    let doc_path = doc.as_ref().map(|d| PathBuf::from(&d.path));
    let resolved = {
        let state = state.clone();
        let selection = req.selection.clone();
        tokio::task::spawn_blocking(move || {
            state.resolver.resolve(&selection, doc_path.as_deref())
        })
        .await
        .map_err(|e| Error::Internal(format!("resolve task panicked: {e}")))??
    };

    let plan = build_prompt(&req.user_query, &resolved);
    let image_path = match &resolved {
        ResolvedContext::Image { path, .. } => Some(path.as_path()),
        ResolvedContext::Text { .. } => None,
    };

    let (model, answer) = dispatch(
        state.backend.as_ref(),
        req.model.as_deref(),
        &state.config.default_model,
        &plan,
        image_path,
    )
    .await?;

    // Transcript is written only after a successful completion: a failed ask
    // leaves no partial chat record. The user message goes first; the
    // assistant insert is not rolled back if a later failure occurs.
    let now = chrono::Utc::now().timestamp_millis();
    state.store.insert_chat(&ChatMessage {
        id: format!("msg_{}", short_id()),
        doc_id: req.document_id.clone(),
        role: Role::User,
        content: req.user_query.clone(),
        created_at: now,
    })?;
    state.store.insert_chat(&ChatMessage {
        id: format!("msg_{}", short_id()),
        doc_id: req.document_id.clone(),
        role: Role::Assistant,
        content: answer.clone(),
        created_at: now,
    })?;

    info!(model = %model, doc_id = ?req.document_id, "answered ask");

    Ok(Json(json!({
        "model": model,
        "answer": answer,
        "used_context": plan.used_context,
    })))
}
