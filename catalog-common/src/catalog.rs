//! Catalog use-case service
//!
//! `CatalogService` owns the connection pool and is handed explicitly to
//! whoever needs the store (the HTTP layer keeps one in its state).
//!
//! # Invariants
//! - Composer names are unique; an existing composer is reused, never
//!   duplicated or modified, by the add workflow.
//! - A composer never has two compositions with the same title.
//! - Every mutating operation runs in a single transaction.

use crate::db::models::{Composer, ComposerEntry, Composition};
use crate::db::{composers, compositions};
use crate::{Error, Result};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info};

/// Message for a submission lacking a required field
pub const MISSING_FIELDS_MESSAGE: &str = "Composer, composition, URL fields are required.";

/// Treat empty strings the same as absent values
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// A validated add/confirm submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub composer_name: String,
    pub composer_lifetime: Option<String>,
    pub composition_title: String,
    pub composition_year: Option<String>,
    pub url: String,
}

impl Submission {
    /// Validate raw fields. `composer_name`, `composition_title` and `url`
    /// must be present and non-empty; empty optional fields become `None`.
    pub fn new(
        composer_name: Option<String>,
        composer_lifetime: Option<String>,
        composition_title: Option<String>,
        composition_year: Option<String>,
        url: Option<String>,
    ) -> Result<Self> {
        match (
            non_empty(composer_name),
            non_empty(composition_title),
            non_empty(url),
        ) {
            (Some(composer_name), Some(composition_title), Some(url)) => Ok(Self {
                composer_name,
                composer_lifetime: non_empty(composer_lifetime),
                composition_title,
                composition_year: non_empty(composition_year),
                url,
            }),
            _ => Err(Error::Validation(MISSING_FIELDS_MESSAGE.to_string())),
        }
    }
}

/// Result of reconciling a submission against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A new composition row was written
    Added {
        composer_id: i64,
        composition_id: i64,
        /// True when the composer row was created by this call
        composer_created: bool,
    },
    /// The composer already has a composition with this title; nothing written
    Duplicate { composer_id: i64, composition_id: i64 },
}

impl ReconcileOutcome {
    /// User-facing message for this outcome
    pub fn message(&self) -> &'static str {
        match self {
            ReconcileOutcome::Added { .. } => "Composition added successfully!",
            ReconcileOutcome::Duplicate { .. } => "This composition already exists.",
        }
    }
}

/// Partial update of a composer. `None` or empty fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposerPatch {
    pub name: Option<String>,
    pub lifetime: Option<String>,
}

/// Partial update of a composition. `None` or empty fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionPatch {
    pub title: Option<String>,
    pub year: Option<String>,
    pub url: Option<String>,
}

/// Store-backed catalog operations
#[derive(Debug, Clone)]
pub struct CatalogService {
    pool: SqlitePool,
}

impl CatalogService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run a trivial query to confirm the store answers
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Insert-or-reuse the composer, then insert-or-reject the composition.
    ///
    /// Both writes share one transaction: if the composition insert fails
    /// (for example on a duplicate url) a composer created by this call is
    /// rolled back as well.
    pub async fn reconcile(&self, submission: &Submission) -> Result<ReconcileOutcome> {
        let mut tx = self.pool.begin().await?;

        let (composer_id, composer_created) =
            match composers::find_by_name(&mut *tx, &submission.composer_name).await? {
                Some(existing) => {
                    debug!("Reusing composer {} ({})", existing.id, existing.name);
                    (existing.id, false)
                }
                None => {
                    let id = composers::insert(
                        &mut *tx,
                        &submission.composer_name,
                        submission.composer_lifetime.as_deref(),
                    )
                    .await?;
                    (id, true)
                }
            };

        if let Some(existing) =
            compositions::find_by_title(&mut *tx, composer_id, &submission.composition_title)
                .await?
        {
            // Nothing written on this path; dropping the transaction is a no-op
            info!(
                "Composition '{}' already exists for composer {}",
                existing.title, composer_id
            );
            return Ok(ReconcileOutcome::Duplicate {
                composer_id,
                composition_id: existing.id,
            });
        }

        let composition_id = compositions::insert(
            &mut *tx,
            composer_id,
            &submission.composition_title,
            submission.composition_year.as_deref(),
            &submission.url,
        )
        .await?;

        tx.commit().await?;

        if composer_created {
            info!("Created composer {} ({})", composer_id, submission.composer_name);
        }
        info!(
            "Added composition {} ('{}') for composer {}",
            composition_id, submission.composition_title, composer_id
        );

        Ok(ReconcileOutcome::Added {
            composer_id,
            composition_id,
            composer_created,
        })
    }

    /// Composers with their compositions for the index page.
    ///
    /// Composers are ordered by the last word of their name, case-insensitive;
    /// compositions by year ascending (text ordering).
    pub async fn list_index(&self) -> Result<Vec<ComposerEntry>> {
        let mut all_composers = composers::list_by_name(&self.pool).await?;
        all_composers.sort_by_cached_key(|c| surname_key(&c.name));

        let mut grouped: HashMap<i64, Vec<Composition>> = HashMap::new();
        for composition in compositions::list_all(&self.pool).await? {
            grouped
                .entry(composition.composer_id)
                .or_default()
                .push(composition);
        }

        Ok(all_composers
            .into_iter()
            .map(|composer| {
                let compositions = grouped.remove(&composer.id).unwrap_or_default();
                ComposerEntry {
                    composer,
                    compositions,
                }
            })
            .collect())
    }

    /// All composers, alphabetical by name (add-form suggestions)
    pub async fn composers_by_name(&self) -> Result<Vec<Composer>> {
        composers::list_by_name(&self.pool).await
    }

    pub async fn composer(&self, id: i64) -> Result<Composer> {
        composers::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| composer_not_found(id))
    }

    pub async fn composition(&self, id: i64) -> Result<Composition> {
        compositions::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| composition_not_found(id))
    }

    /// Apply a partial update to a composer and return the stored row
    pub async fn edit_composer(&self, id: i64, patch: ComposerPatch) -> Result<Composer> {
        let name = non_empty(patch.name);
        let lifetime = non_empty(patch.lifetime);

        let mut tx = self.pool.begin().await?;
        let matched = composers::update(&mut *tx, id, name.as_deref(), lifetime.as_deref()).await?;
        if matched == 0 {
            return Err(composer_not_found(id));
        }
        let updated = composers::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| composer_not_found(id))?;
        tx.commit().await?;

        info!("Updated composer {}", id);
        Ok(updated)
    }

    /// Apply a partial update to a composition and return the stored row
    pub async fn edit_composition(&self, id: i64, patch: CompositionPatch) -> Result<Composition> {
        let title = non_empty(patch.title);
        let year = non_empty(patch.year);
        let url = non_empty(patch.url);

        let mut tx = self.pool.begin().await?;
        let matched = compositions::update(
            &mut *tx,
            id,
            title.as_deref(),
            year.as_deref(),
            url.as_deref(),
        )
        .await?;
        if matched == 0 {
            return Err(composition_not_found(id));
        }
        let updated = compositions::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| composition_not_found(id))?;
        tx.commit().await?;

        info!("Updated composition {}", id);
        Ok(updated)
    }

    /// Delete a composer and all of its compositions.
    /// Returns the number of compositions removed with it.
    pub async fn delete_composer(&self, id: i64) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        if composers::find_by_id(&mut *tx, id).await?.is_none() {
            return Err(composer_not_found(id));
        }
        let removed = compositions::delete_for_composer(&mut *tx, id).await?;
        composers::delete(&mut *tx, id).await?;
        tx.commit().await?;

        info!("Deleted composer {} and {} composition(s)", id, removed);
        Ok(removed)
    }

    pub async fn delete_composition(&self, id: i64) -> Result<()> {
        let removed = compositions::delete(&self.pool, id).await?;
        if removed == 0 {
            return Err(composition_not_found(id));
        }

        info!("Deleted composition {}", id);
        Ok(())
    }
}

/// Sort key: last whitespace-separated word of the name, lowercased
pub fn surname_key(name: &str) -> String {
    name.split_whitespace()
        .next_back()
        .unwrap_or_default()
        .to_lowercase()
}

fn composer_not_found(id: i64) -> Error {
    Error::NotFound(format!("Composer {} not found", id))
}

fn composition_not_found(id: i64) -> Error {
    Error::NotFound(format!("Composition {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_requires_core_fields() {
        let err = Submission::new(
            Some("Bach".into()),
            None,
            Some(String::new()),
            None,
            Some("https://x".into()),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg == MISSING_FIELDS_MESSAGE));

        assert!(Submission::new(None, None, Some("t".into()), None, Some("u".into())).is_err());
        assert!(Submission::new(Some("c".into()), None, Some("t".into()), None, None).is_err());
    }

    #[test]
    fn test_submission_blank_optionals_become_none() {
        let submission = Submission::new(
            Some("Bach".into()),
            Some(String::new()),
            Some("Prelude".into()),
            Some(String::new()),
            Some("https://x".into()),
        )
        .unwrap();
        assert_eq!(submission.composer_lifetime, None);
        assert_eq!(submission.composition_year, None);
    }

    #[test]
    fn test_surname_key() {
        assert_eq!(surname_key("Johann Sebastian Bach"), "bach");
        assert_eq!(surname_key("Chopin"), "chopin");
        assert_eq!(surname_key("  "), "");
        assert_eq!(surname_key("Ludwig van BEETHOVEN "), "beethoven");
    }
}
