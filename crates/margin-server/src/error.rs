//! HTTP mapping for core errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

use margin_core::Error;

/// Wraps a core error so route handlers can use `?`.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) | Error::InvalidPage { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Completion(_) | Error::EmptyCompletion => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!("request failed: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: Error) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn errors_map_to_expected_statuses() {
        assert_eq!(
            status_of(Error::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(Error::InvalidPage { page: 9, pages: 2 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(Error::NotFound("Document not found".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(Error::EmptyCompletion),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(Error::Database("locked".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
