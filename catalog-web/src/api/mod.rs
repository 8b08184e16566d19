//! HTTP API handlers for catalog-web

pub mod auth;
pub mod catalog;
pub mod status;

pub use auth::auth_middleware;
pub use catalog::{catalog_routes, delete_composer, delete_composition, edit_composer, edit_composition};
pub use status::{status_routes, BuildInfo};
