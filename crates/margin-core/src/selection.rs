//! Selection data model — the context anchor a question is asked about.
//!
//! A selection is transient request state; it is never persisted. Modeled as
//! a tagged enum so the resolver and prompt builder handle both variants
//! exhaustively.

use serde::{Deserialize, Serialize};

/// Rectangle on a rendered page image, in pixel coordinates.
///
/// Not guaranteed non-degenerate on input: width/height may be zero or
/// negative, and the box may lie partly or fully outside the image. The
/// cropper normalizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// User-specified selection: a text span or a rectangular image region,
/// tied to a 1-indexed page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Selection {
    Text {
        page: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
    Image {
        page: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bbox: Option<BoundingBox>,
    },
}

impl Selection {
    /// 1-indexed page the selection refers to.
    pub fn page(&self) -> u32 {
        match self {
            Selection::Text { page, .. } | Selection::Image { page, .. } => *page,
        }
    }
}
