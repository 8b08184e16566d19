//! API token middleware for the JSON mutation endpoints
//!
//! When no token is configured every request passes through. Otherwise the
//! request must carry the token in the `X-Api-Token` header.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

/// Header carrying the API token
pub const API_TOKEN_HEADER: &str = "x-api-token";

/// Authentication middleware
///
/// Returns 401 Unauthorized if the token is missing or wrong.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.api_token.as_deref() else {
        // No token configured - auth disabled
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(API_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided {
        Some(token) if token == expected => Ok(next.run(request).await),
        Some(_) => {
            warn!("Rejected {} {}: invalid API token", request.method(), request.uri().path());
            Err(ApiError::Unauthorized("Invalid API token".to_string()))
        }
        None => {
            warn!("Rejected {} {}: missing API token", request.method(), request.uri().path());
            Err(ApiError::Unauthorized("Missing API token".to_string()))
        }
    }
}
