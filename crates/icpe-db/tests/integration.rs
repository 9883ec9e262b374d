//! Offline unit tests for icpe-db pool configuration and row types.
//! These tests do not require a live database connection.

use icpe_core::{AppConfig, Category, Environment, FacilityReference, OutputRow, WasteType};
use icpe_db::{FacilityRow, PoolConfig, RubriqueRow, ScrapeRunRow, ScrapeRunTotals};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        rubriques_path: None,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        scraper_request_timeout_secs: 30,
        scraper_user_agent: "ua".to_string(),
        scraper_max_concurrent: 5,
        scraper_chunk_size: 100,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn facility_row_converts_into_reference() {
    let row = FacilityRow {
        code_s3ic: "0065.06351".to_string(),
        url_fiche: "https://www.georisques.gouv.fr/fiche/0065.06351".to_string(),
    };

    let reference = FacilityReference::from(row);
    assert_eq!(reference.facility_id, "0065.06351");
    assert_eq!(
        reference.detail_url,
        "https://www.georisques.gouv.fr/fiche/0065.06351"
    );
}

#[test]
fn rubrique_row_maps_classified_output_to_wire_names() {
    let output = OutputRow {
        facility_id: "0065.06351".to_string(),
        code: "2760".to_string(),
        sub_code: Some("3".to_string()),
        authorization_date: "05/02/2019".to_string(),
        activity_status: "En fonct.".to_string(),
        authorization_regime: "E".to_string(),
        activity_description: "Installation de stockage de déchets inertes".to_string(),
        volume: Some("35000".to_string()),
        unit: Some(" ".to_string()),
        category: Some(Category::WasteProcessor),
        waste_type: Some(WasteType::Inerte),
    };

    let row = RubriqueRow::from(&output);
    assert_eq!(row.code_s3ic, "0065.06351");
    assert_eq!(row.rubrique, "2760");
    assert_eq!(row.alinea.as_deref(), Some("3"));
    assert_eq!(row.unite.as_deref(), Some(" "));
    assert_eq!(row.category.as_deref(), Some("WASTEPROCESSOR"));
    assert_eq!(row.waste_type.as_deref(), Some("INERTE"));
}

#[test]
fn rubrique_row_keeps_unclassified_output_null() {
    let output = OutputRow {
        facility_id: "0001.00001".to_string(),
        code: "2716".to_string(),
        ..OutputRow::default()
    };

    let row = RubriqueRow::from(&output);
    assert!(row.alinea.is_none());
    assert!(row.category.is_none());
    assert!(row.waste_type.is_none());
}

/// Compile-time smoke test: confirm that [`ScrapeRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn scrape_run_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = ScrapeRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        trigger_source: "cli".to_string(),
        status: "queued".to_string(),
        started_at: None,
        completed_at: None,
        facilities_processed: 0_i32,
        facilities_failed: 0_i32,
        rows_written: 0_i32,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.trigger_source, "cli");
    assert_eq!(row.status, "queued");
    assert!(row.started_at.is_none());
    assert!(row.error_message.is_none());
}

#[test]
fn scrape_run_totals_default_to_zero() {
    let totals = ScrapeRunTotals::default();
    assert_eq!(totals.facilities_processed, 0);
    assert_eq!(totals.facilities_failed, 0);
    assert_eq!(totals.rows_written, 0);
}

#[test]
fn migrations_create_tables_unconditionally() {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../../migrations");
    let mut checked = 0;
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("sql") {
            continue;
        }
        let sql = std::fs::read_to_string(&path).unwrap();
        assert!(sql.contains("CREATE TABLE "), "{} creates no table", path.display());
        assert!(
            !sql.contains("IF NOT EXISTS"),
            "{} uses IF NOT EXISTS",
            path.display()
        );
        checked += 1;
    }
    assert!(checked >= 3, "found {checked} migrations");
}
