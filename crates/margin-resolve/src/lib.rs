//! Margin Resolve — turns a selection into concrete context material.
//!
//! A text selection resolves to a string (inline content, or the full page
//! text as fallback). An image selection resolves to a cropped PNG written
//! to the image storage area. Every image ask re-renders and re-crops; crop
//! files are never cleaned up by this crate.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use margin_core::{Error, Result, Selection};
use margin_pdf::{crop_bbox, PageRenderer};

/// Zoom factor for page rasterization before cropping.
pub const CROP_ZOOM: f32 = 2.0;

/// Concrete context material substituted for a selection before prompting.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedContext {
    /// Non-empty text, either inline from the request or extracted from the page.
    Text { page: u32, content: String },
    /// Cropped page region persisted as a PNG file.
    Image { page: u32, path: PathBuf },
}

/// Resolves selections against stored documents.
pub struct ContextResolver {
    renderer: Arc<dyn PageRenderer>,
    image_dir: PathBuf,
}

impl ContextResolver {
    pub fn new(renderer: Arc<dyn PageRenderer>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            image_dir: image_dir.into(),
        }
    }

    /// Resolve a selection, reading the document at `doc_path` when needed.
    ///
    /// Validation order for image selections: document presence first, then
    /// bounding box. Page bounds are the caller's responsibility; the
    /// renderer still rejects out-of-range pages if violated.
    pub fn resolve(&self, selection: &Selection, doc_path: Option<&Path>) -> Result<ResolvedContext> {
        match selection {
            Selection::Text { page, content } => {
                if let Some(content) = content.as_deref().filter(|c| !c.is_empty()) {
                    return Ok(ResolvedContext::Text {
                        page: *page,
                        content: content.to_string(),
                    });
                }
                // Fallback: no inline text, pull the whole page.
                let doc_path = doc_path.ok_or_else(|| {
                    Error::Validation(
                        "selection.content required or provide document_id".to_string(),
                    )
                })?;
                let content = self.renderer.page_text(doc_path, *page)?;
                debug!(page, chars = content.len(), "resolved text selection from page");
                Ok(ResolvedContext::Text {
                    page: *page,
                    content,
                })
            }
            Selection::Image { page, bbox } => {
                let doc_path = doc_path.ok_or_else(|| {
                    Error::Validation("document_id required for image selection".to_string())
                })?;
                let bbox = bbox.as_ref().ok_or_else(|| {
                    Error::Validation("selection.bbox required for image selection".to_string())
                })?;

                let rendered = self.renderer.render_page(doc_path, *page, CROP_ZOOM)?;
                let cropped = crop_bbox(&rendered, bbox);

                let out_path = self
                    .image_dir
                    .join(format!("crop_{}.png", short_id()));
                cropped
                    .save_with_format(&out_path, image::ImageFormat::Png)
                    .map_err(|e| Error::Image(format!("crop save failed: {e}")))?;
                info!(page, path = %out_path.display(), "saved selection crop");

                Ok(ResolvedContext::Image {
                    page: *page,
                    path: out_path,
                })
            }
        }
    }
}

/// 12-hex-char unique suffix for generated artifact names.
pub fn short_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..12].to_string()
}
