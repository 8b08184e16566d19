//! catalog-web library - composer catalog web service
//!
//! Server-rendered catalog pages, the add/confirm workflow and a small JSON
//! API for editing and deleting rows.

use std::sync::Arc;

use axum::Router;
use catalog_common::CatalogService;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod fetcher;
pub mod flash;
pub mod pages;

pub use crate::error::{ApiError, ApiResult};

use crate::fetcher::TitleFetcher;
use crate::flash::FlashStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Catalog store and workflows
    pub catalog: CatalogService,
    /// Resolves a media URL to its title for the add form
    pub fetcher: Arc<dyn TitleFetcher>,
    /// Pending flash messages per browser
    pub flashes: FlashStore,
    /// Token required on JSON mutation endpoints; `None` disables the check
    pub api_token: Option<String>,
}

impl AppState {
    pub fn new(catalog: CatalogService, fetcher: Arc<dyn TitleFetcher>) -> Self {
        Self {
            catalog,
            fetcher,
            flashes: FlashStore::default(),
            api_token: None,
        }
    }

    pub fn with_api_token(mut self, api_token: Option<String>) -> Self {
        self.api_token = api_token;
        self
    }

    pub fn with_flash_store(mut self, flashes: FlashStore) -> Self {
        self.flashes = flashes;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;

    // JSON mutations (token-checked when a token is configured)
    let protected = api::catalog_routes().layer(middleware::from_fn_with_state(
        state.clone(),
        api::auth_middleware,
    ));

    Router::new()
        .merge(protected)
        .merge(pages::page_routes())
        .merge(api::status_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
