//! Server-rendered HTML pages
//!
//! - **Info pages** (`info`): home and composer pages
//! - **Scales** (`scales`): scale reference table
//! - **Catalog** (`catalog`): composer index, add form and confirm workflow
//! - **Static assets** (`assets`): page script and stylesheet

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

mod assets;
mod catalog;
mod info;
pub mod layout;
pub mod scales;

pub use catalog::{AddForm, ConfirmForm};

/// Build page routes
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(info::home_page))
        .route("/scales", get(scales::scales_page))
        .route("/composer", get(info::composer_page))
        .route("/index", get(catalog::index_page))
        .route("/index/add", get(catalog::add_page).post(catalog::add_prefill))
        .route("/confirm", post(catalog::confirm))
        .route("/static/index.js", get(assets::serve_index_js))
        .route("/static/catalog.css", get(assets::serve_catalog_css))
}
