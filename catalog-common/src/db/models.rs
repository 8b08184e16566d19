//! Database models

use serde::Serialize;
use sqlx::FromRow;

/// A composer row. `name` is unique across the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Composer {
    pub id: i64,
    pub name: String,
    /// Free-form date range, e.g. "1685-1750"
    pub lifetime: Option<String>,
    pub style: Option<String>,
}

/// A composition row. `url` is unique across the store, and `title` is unique
/// per composer (enforced by the reconciliation workflow, not the schema).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Composition {
    pub id: i64,
    pub composer_id: i64,
    pub title: String,
    pub year: Option<String>,
    pub url: String,
}

/// A composer together with its compositions, as listed on the index page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposerEntry {
    pub composer: Composer,
    pub compositions: Vec<Composition>,
}
