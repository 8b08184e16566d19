//! # Catalog Common Library
//!
//! Shared code for the composer catalog:
//! - Database initialization, row models and queries
//! - Video title parsing
//! - Add/confirm reconciliation and edit/delete operations
//! - Configuration loading

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod title;

pub use catalog::{CatalogService, ReconcileOutcome, Submission};
pub use error::{Error, Result, UniqueConstraint};
pub use title::{parse_title, ParsedTitle};
