//! Database operations for `scrape_runs`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{to_i32, DbError};

/// A row from the `scrape_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScrapeRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub facilities_processed: i32,
    pub facilities_failed: i32,
    pub rows_written: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Counters recorded when a run succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeRunTotals {
    pub facilities_processed: usize,
    pub facilities_failed: usize,
    pub rows_written: usize,
}

const RUN_COLUMNS: &str = "id, public_id, trigger_source, status, started_at, completed_at, \
     facilities_processed, facilities_failed, rows_written, error_message, created_at";

/// Creates a new scrape run in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_scrape_run(
    pool: &PgPool,
    trigger_source: &str,
) -> Result<ScrapeRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, ScrapeRunRow>(&format!(
        "INSERT INTO scrape_runs (public_id, trigger_source, status) \
         VALUES ($1, $2, 'queued') \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(public_id)
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a queued run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidScrapeRunTransition`] if the run is not
/// `queued`, or [`DbError::Sqlx`] if the update fails.
pub async fn start_scrape_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scrape_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidScrapeRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a running run as `succeeded` and records its totals.
///
/// # Errors
///
/// Returns [`DbError::OutOfRange`] if a counter does not fit the column,
/// [`DbError::InvalidScrapeRunTransition`] if the run is not `running`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn complete_scrape_run(
    pool: &PgPool,
    id: i64,
    totals: ScrapeRunTotals,
) -> Result<(), DbError> {
    let processed = to_i32("facilities_processed", totals.facilities_processed)?;
    let failed = to_i32("facilities_failed", totals.facilities_failed)?;
    let written = to_i32("rows_written", totals.rows_written)?;

    let result = sqlx::query(
        "UPDATE scrape_runs \
         SET status = 'succeeded', completed_at = NOW(), \
             facilities_processed = $1, facilities_failed = $2, rows_written = $3 \
         WHERE id = $4 AND status = 'running'",
    )
    .bind(processed)
    .bind(failed)
    .bind(written)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidScrapeRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a running run as `failed` with `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidScrapeRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_scrape_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scrape_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidScrapeRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_scrape_run(pool: &PgPool, id: i64) -> Result<ScrapeRunRow, DbError> {
    let row = sqlx::query_as::<_, ScrapeRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM scrape_runs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scrape_runs(pool: &PgPool, limit: i64) -> Result<Vec<ScrapeRunRow>, DbError> {
    let rows = sqlx::query_as::<_, ScrapeRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM scrape_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
