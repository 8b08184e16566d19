//! Composition queries

use crate::db::models::Composition;
use crate::Result;
use sqlx::{Executor, Sqlite};

const COMPOSITION_COLUMNS: &str = "id, composer_id, title, year, url";

/// Look up a composition by exact title within one composer
pub async fn find_by_title<'e, E>(
    executor: E,
    composer_id: i64,
    title: &str,
) -> Result<Option<Composition>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {COMPOSITION_COLUMNS} FROM compositions WHERE composer_id = ? AND title = ? LIMIT 1"
    );
    let composition = sqlx::query_as::<_, Composition>(&sql)
        .bind(composer_id)
        .bind(title)
        .fetch_optional(executor)
        .await?;
    Ok(composition)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Composition>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COMPOSITION_COLUMNS} FROM compositions WHERE id = ?");
    let composition = sqlx::query_as::<_, Composition>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(composition)
}

/// Insert a composition and return its generated id.
///
/// Fails with a unique-constraint error if the url is taken, or a foreign key
/// error if the composer does not exist.
pub async fn insert<'e, E>(
    executor: E,
    composer_id: i64,
    title: &str,
    year: Option<&str>,
    url: &str,
) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO compositions (composer_id, title, year, url) VALUES (?, ?, ?, ?)",
    )
    .bind(composer_id)
    .bind(title)
    .bind(year)
    .bind(url)
    .execute(executor)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Every composition, grouped by composer and year ascending within a group.
///
/// `year` is text, so the ordering is lexicographic; rows without a year
/// come first.
pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Composition>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {COMPOSITION_COLUMNS} FROM compositions ORDER BY composer_id ASC, year ASC, id ASC"
    );
    let compositions = sqlx::query_as::<_, Composition>(&sql).fetch_all(executor).await?;
    Ok(compositions)
}

/// Overwrite only the fields given as `Some`. Returns the number of rows
/// matched (0 when the id does not exist).
pub async fn update<'e, E>(
    executor: E,
    id: i64,
    title: Option<&str>,
    year: Option<&str>,
    url: Option<&str>,
) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE compositions
        SET title = COALESCE(?, title),
            year = COALESCE(?, year),
            url = COALESCE(?, url)
        WHERE id = ?
        "#,
    )
    .bind(title)
    .bind(year)
    .bind(url)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM compositions WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Delete every composition of a composer. Returns the number removed.
pub async fn delete_for_composer<'e, E>(executor: E, composer_id: i64) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM compositions WHERE composer_id = ?")
        .bind(composer_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count<'e, E>(executor: E) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM compositions")
        .fetch_one(executor)
        .await?;
    Ok(count)
}
