//! Shared application state.

use std::sync::Arc;

use margin_chat::CompletionBackend;
use margin_core::MarginConfig;
use margin_pdf::PageRenderer;
use margin_resolve::ContextResolver;
use margin_store::SqliteStore;

/// Shared state accessible from all route handlers. Everything except the
/// store and the filesystem directories is immutable after startup.
pub struct AppState {
    pub config: MarginConfig,
    pub store: SqliteStore,
    pub renderer: Arc<dyn PageRenderer>,
    pub backend: Arc<dyn CompletionBackend>,
    pub resolver: ContextResolver,
}

impl AppState {
    pub fn new(
        config: MarginConfig,
        store: SqliteStore,
        renderer: Arc<dyn PageRenderer>,
        backend: Arc<dyn CompletionBackend>,
    ) -> Self {
        let resolver = ContextResolver::new(renderer.clone(), config.data_paths.images.clone());
        Self {
            config,
            store,
            renderer,
            backend,
            resolver,
        }
    }
}
