//! Composer queries
//!
//! Every function accepts any SQLite executor, so callers can run them
//! against the pool or inside a transaction (`&mut *tx`).

use crate::db::models::Composer;
use crate::Result;
use sqlx::{Executor, Sqlite};

const COMPOSER_COLUMNS: &str = "id, name, lifetime, style";

/// Look up a composer by exact (case-sensitive) name
pub async fn find_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Composer>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COMPOSER_COLUMNS} FROM composers WHERE name = ?");
    let composer = sqlx::query_as::<_, Composer>(&sql)
        .bind(name)
        .fetch_optional(executor)
        .await?;
    Ok(composer)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Composer>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COMPOSER_COLUMNS} FROM composers WHERE id = ?");
    let composer = sqlx::query_as::<_, Composer>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(composer)
}

/// Insert a composer and return its generated id.
///
/// Fails with a unique-constraint error if the name is taken.
pub async fn insert<'e, E>(executor: E, name: &str, lifetime: Option<&str>) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("INSERT INTO composers (name, lifetime) VALUES (?, ?)")
        .bind(name)
        .bind(lifetime)
        .execute(executor)
        .await?;
    Ok(result.last_insert_rowid())
}

/// All composers, alphabetical by name
pub async fn list_by_name<'e, E>(executor: E) -> Result<Vec<Composer>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COMPOSER_COLUMNS} FROM composers ORDER BY name ASC");
    let composers = sqlx::query_as::<_, Composer>(&sql).fetch_all(executor).await?;
    Ok(composers)
}

/// Overwrite only the fields given as `Some`. Returns the number of rows
/// matched (0 when the id does not exist).
pub async fn update<'e, E>(
    executor: E,
    id: i64,
    name: Option<&str>,
    lifetime: Option<&str>,
) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE composers SET name = COALESCE(?, name), lifetime = COALESCE(?, lifetime) WHERE id = ?",
    )
    .bind(name)
    .bind(lifetime)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Delete a composer row. Returns the number of rows removed.
pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM composers WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count<'e, E>(executor: E) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM composers")
        .fetch_one(executor)
        .await?;
    Ok(count)
}
