//! Write operations for the `rubriques` table.

use sqlx::PgPool;

use icpe_core::OutputRow;

use crate::DbError;

/// A row from the `rubriques` table, using the column names of the
/// consolidation schema.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RubriqueRow {
    pub code_s3ic: String,
    pub rubrique: String,
    pub alinea: Option<String>,
    pub date_autorisation: String,
    pub etat_activite: String,
    pub regime_autorise: String,
    pub activite: String,
    pub volume: Option<String>,
    pub unite: Option<String>,
    pub category: Option<String>,
    pub waste_type: Option<String>,
}

impl From<&OutputRow> for RubriqueRow {
    fn from(row: &OutputRow) -> Self {
        Self {
            code_s3ic: row.facility_id.clone(),
            rubrique: row.code.clone(),
            alinea: row.sub_code.clone(),
            date_autorisation: row.authorization_date.clone(),
            etat_activite: row.activity_status.clone(),
            regime_autorise: row.authorization_regime.clone(),
            activite: row.activity_description.clone(),
            volume: row.volume.clone(),
            unite: row.unit.clone(),
            category: row.category.map(|c| c.as_str().to_owned()),
            waste_type: row.waste_type.map(|w| w.as_str().to_owned()),
        }
    }
}

/// Replaces the stored rubriques of `facility_ids` with `rows`.
///
/// Existing rows for every listed facility are deleted, then `rows` are
/// inserted with a single `INSERT … SELECT * FROM UNNEST(…)`, all in one
/// transaction. Facilities listed with no rows end up with none stored, so
/// re-running a chunk is idempotent.
///
/// Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the transaction is
/// rolled back.
pub async fn replace_rubriques(
    pool: &PgPool,
    run_id: i64,
    facility_ids: &[String],
    rows: &[OutputRow],
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM rubriques WHERE code_s3ic = ANY($1::text[])")
        .bind(facility_ids)
        .execute(&mut *tx)
        .await?;

    if rows.is_empty() {
        tx.commit().await?;
        return Ok(0);
    }

    // Collect each column into a parallel Vec for UNNEST binding.
    let mut code_s3ics: Vec<String> = Vec::with_capacity(rows.len());
    let mut rubriques: Vec<String> = Vec::with_capacity(rows.len());
    let mut alineas: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut dates: Vec<String> = Vec::with_capacity(rows.len());
    let mut etats: Vec<String> = Vec::with_capacity(rows.len());
    let mut regimes: Vec<String> = Vec::with_capacity(rows.len());
    let mut activites: Vec<String> = Vec::with_capacity(rows.len());
    let mut volumes: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut unites: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut categories: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut waste_types: Vec<Option<String>> = Vec::with_capacity(rows.len());

    for row in rows.iter().map(RubriqueRow::from) {
        code_s3ics.push(row.code_s3ic);
        rubriques.push(row.rubrique);
        alineas.push(row.alinea);
        dates.push(row.date_autorisation);
        etats.push(row.etat_activite);
        regimes.push(row.regime_autorise);
        activites.push(row.activite);
        volumes.push(row.volume);
        unites.push(row.unite);
        categories.push(row.category);
        waste_types.push(row.waste_type);
    }

    let result = sqlx::query(
        "INSERT INTO rubriques \
             (scrape_run_id, code_s3ic, rubrique, alinea, date_autorisation, etat_activite, \
              regime_autorise, activite, volume, unite, category, waste_type) \
         SELECT $1, * FROM UNNEST(\
              $2::text[], $3::text[], $4::text[], $5::text[], $6::text[], $7::text[], \
              $8::text[], $9::text[], $10::text[], $11::text[], $12::text[])",
    )
    .bind(run_id)
    .bind(&code_s3ics)
    .bind(&rubriques)
    .bind(&alineas)
    .bind(&dates)
    .bind(&etats)
    .bind(&regimes)
    .bind(&activites)
    .bind(&volumes)
    .bind(&unites)
    .bind(&categories)
    .bind(&waste_types)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(result.rows_affected())
}

/// Lists the stored rubriques of one facility in insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_rubriques_for_facility(
    pool: &PgPool,
    code_s3ic: &str,
) -> Result<Vec<RubriqueRow>, DbError> {
    let rows = sqlx::query_as::<_, RubriqueRow>(
        "SELECT code_s3ic, rubrique, alinea, date_autorisation, etat_activite, \
                regime_autorise, activite, volume, unite, category, waste_type \
         FROM rubriques \
         WHERE code_s3ic = $1 \
         ORDER BY id",
    )
    .bind(code_s3ic)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
