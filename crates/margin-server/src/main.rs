//! Margin — PDF selection Q&A backend.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use margin_server::{build_router, AppState};

fn resolve_data_dir() -> PathBuf {
    std::env::var("MARGIN_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = margin_core::MarginConfig::from_env(&data_dir)?;
    let port = config.port;

    let store = margin_store::SqliteStore::open(&config.data_paths.db)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {e}"))?;

    let renderer = Arc::new(margin_pdf::PdfiumRenderer::new());
    let backend = Arc::new(margin_chat::HttpBackend::from_env());

    let state = Arc::new(AppState::new(config, store, renderer, backend));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Margin server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
