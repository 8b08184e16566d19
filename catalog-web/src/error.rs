//! Error types for catalog-web
//!
//! JSON endpoints answer failures with `{"success": false, "message": ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Convenience Result type for JSON handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or incomplete request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Missing or wrong API token (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Row not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Store or other unexpected failure (500). `context` is the generic
    /// operation message shown before the underlying error text.
    #[error("{context}: {source}")]
    Internal {
        context: &'static str,
        #[source]
        source: catalog_common::Error,
    },
}

impl ApiError {
    /// Map a catalog error raised while performing `context`
    pub fn from_catalog(context: &'static str, err: catalog_common::Error) -> Self {
        match err {
            catalog_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            catalog_common::Error::Validation(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal {
                context,
                source: other,
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("{}", self);
        }

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Failure while rendering an HTML page (500 with a plain error page)
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct PageError {
    pub context: &'static str,
    #[source]
    pub source: catalog_common::Error,
}

impl PageError {
    pub fn new(context: &'static str, source: catalog_common::Error) -> Self {
        Self { context, source }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        error!("{}", self);
        let body = format!(
            "<!DOCTYPE html><html><head><title>Error</title></head>\
             <body><h1>Something went wrong</h1><p>{}</p><p><a href=\"/\">Home</a></p></body></html>",
            crate::pages::layout::escape_html(self.context)
        );
        (StatusCode::INTERNAL_SERVER_ERROR, axum::response::Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_errors_map_to_status() {
        let not_found = ApiError::from_catalog(
            "Failed to update composer",
            catalog_common::Error::NotFound("Composer 3 not found".into()),
        );
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Composer 3 not found");

        let internal = ApiError::from_catalog(
            "Failed to update composer",
            catalog_common::Error::Config("boom".into()),
        );
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            internal.to_string(),
            "Failed to update composer: Configuration error: boom"
        );
    }
}
