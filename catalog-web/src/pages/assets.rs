//! Static asset routes

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

const INDEX_JS: &str = include_str!("../../ui/index.js");
const CATALOG_CSS: &str = include_str!("../../ui/catalog.css");

/// GET /static/index.js
///
/// Edit/delete modal logic for the index page
pub async fn serve_index_js() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript")],
        INDEX_JS,
    )
        .into_response()
}

/// GET /static/catalog.css
pub async fn serve_catalog_css() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/css")],
        CATALOG_CSS,
    )
        .into_response()
}
