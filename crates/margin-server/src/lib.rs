//! Margin server — axum HTTP surface over the selection Q&A core.

pub mod error;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
