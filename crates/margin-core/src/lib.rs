//! Margin Core — error taxonomy, configuration, selection data model.

pub mod config;
pub mod error;
pub mod selection;

pub use config::{DataPaths, MarginConfig};
pub use error::{Error, Result};
pub use selection::{BoundingBox, Selection};
