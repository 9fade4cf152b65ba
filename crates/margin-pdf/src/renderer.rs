//! Page rendering and text extraction behind the [`PageRenderer`] contract.
//!
//! The pdfium C++ library is CPU-bound and not safe to call from async
//! contexts, so all methods here are blocking; callers on a Tokio runtime
//! wrap them in `spawn_blocking`.

use std::path::Path;

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::debug;

use margin_core::{Error, Result};

/// Contract for the PDF decoder: page count, page text, rasterized pages.
///
/// Pages are 1-indexed everywhere. Implementations must return
/// [`Error::InvalidPage`] for out-of-range pages.
pub trait PageRenderer: Send + Sync {
    /// Total number of pages in the document.
    fn page_count(&self, pdf_path: &Path) -> Result<u32>;

    /// Extracted text of one page, trimmed of leading/trailing whitespace.
    fn page_text(&self, pdf_path: &Path, page: u32) -> Result<String>;

    /// Rasterize one page at the given zoom factor (1.0 = 1 px per point).
    fn render_page(&self, pdf_path: &Path, page: u32, zoom: f32) -> Result<DynamicImage>;
}

/// pdfium-backed implementation of [`PageRenderer`].
pub struct PdfiumRenderer;

impl PdfiumRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfiumRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRenderer for PdfiumRenderer {
    fn page_count(&self, pdf_path: &Path) -> Result<u32> {
        let pdfium = bind_pdfium()?;
        let document = load_document(&pdfium, pdf_path)?;
        Ok(document.pages().len() as u32)
    }

    fn page_text(&self, pdf_path: &Path, page: u32) -> Result<String> {
        let pdfium = bind_pdfium()?;
        let document = load_document(&pdfium, pdf_path)?;
        let pages = document.pages();
        check_page_bounds(page, pages.len() as u32)?;

        let page = pages
            .get((page - 1) as u16)
            .map_err(|e| Error::Pdf(format!("page load failed: {e}")))?;
        let text = page
            .text()
            .map_err(|e| Error::Pdf(format!("text extraction failed: {e}")))?
            .all();
        Ok(text.trim().to_string())
    }

    fn render_page(&self, pdf_path: &Path, page: u32, zoom: f32) -> Result<DynamicImage> {
        let pdfium = bind_pdfium()?;
        let document = load_document(&pdfium, pdf_path)?;
        let pages = document.pages();
        check_page_bounds(page, pages.len() as u32)?;

        let page = pages
            .get((page - 1) as u16)
            .map_err(|e| Error::Pdf(format!("page load failed: {e}")))?;

        // Page dimensions are in points; the zoom factor scales them to pixels.
        let width = (page.width().value * zoom) as i32;
        let height = (page.height().value * zoom) as i32;

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width)
                    .set_target_height(height),
            )
            .map_err(|e| Error::Pdf(format!("render failed: {e}")))?;

        let img = bitmap.as_image();
        debug!("rendered page -> {}x{} px", img.width(), img.height());
        Ok(img)
    }
}

fn check_page_bounds(page: u32, total: u32) -> Result<()> {
    if page < 1 || page > total {
        return Err(Error::InvalidPage { page, pages: total });
    }
    Ok(())
}

fn bind_pdfium() -> Result<Pdfium> {
    Ok(Pdfium::new(Pdfium::bind_to_system_library().map_err(
        |e| Error::Pdf(format!("pdfium bind failed: {e}")),
    )?))
}

fn load_document<'a>(pdfium: &'a Pdfium, pdf_path: &Path) -> Result<PdfDocument<'a>> {
    pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| Error::Pdf(format!("pdfium open failed: {e}")))
}
