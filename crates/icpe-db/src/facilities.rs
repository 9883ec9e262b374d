//! Read operations for the `installations` table.

use sqlx::PgPool;

use icpe_core::FacilityReference;

use crate::DbError;

/// A facility that has a detail page to scrape.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FacilityRow {
    pub code_s3ic: String,
    pub url_fiche: String,
}

impl From<FacilityRow> for FacilityReference {
    fn from(row: FacilityRow) -> Self {
        FacilityReference::new(row.code_s3ic, row.url_fiche)
    }
}

/// Counts facilities with a non-empty `url_fiche`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_facilities(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM installations \
         WHERE url_fiche IS NOT NULL AND url_fiche <> ''",
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Returns the next page of facilities ordered by `code_s3ic`, starting
/// strictly after `after` (keyset pagination).
///
/// Pass `None` for the first page. An empty result means there are no more
/// facilities.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_facilities_after(
    pool: &PgPool,
    after: Option<&str>,
    limit: i64,
) -> Result<Vec<FacilityRow>, DbError> {
    let rows = sqlx::query_as::<_, FacilityRow>(
        "SELECT code_s3ic, url_fiche \
         FROM installations \
         WHERE url_fiche IS NOT NULL AND url_fiche <> '' \
           AND ($1::TEXT IS NULL OR code_s3ic > $1) \
         ORDER BY code_s3ic \
         LIMIT $2",
    )
    .bind(after)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
