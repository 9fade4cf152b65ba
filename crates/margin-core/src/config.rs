//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Paths to all Margin data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Uploaded PDF storage (`data/pdfs/`).
    pub pdfs: PathBuf,
    /// Generated crop images (`data/images/`).
    pub images: PathBuf,
    /// SQLite database directory (`data/db/`).
    pub db: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            pdfs: root.join("pdfs"),
            images: root.join("images"),
            db: root.join("db"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.pdfs)?;
        std::fs::create_dir_all(&self.images)?;
        std::fs::create_dir_all(&self.db)?;
        Ok(())
    }
}

/// Top-level Margin configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// Model used when the request does not name one.
    pub default_model: String,
    /// Allowed CORS origins; `*` means permissive.
    pub cors_origins: Vec<String>,
}

impl MarginConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let default_model =
            std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            default_model,
            cors_origins,
        })
    }
}
