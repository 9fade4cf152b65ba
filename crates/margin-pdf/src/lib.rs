//! Margin PDF — page rendering, text extraction, and region cropping.

pub mod crop;
pub mod renderer;

pub use crop::crop_bbox;
pub use renderer::{PageRenderer, PdfiumRenderer};
