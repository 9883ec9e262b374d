//! `scrape` command handler.
//!
//! Pages through `installations` in keyset order, enriches each chunk with
//! [`RubriqueScraper`], and replaces the stored rubriques of every facility
//! whose page was read. One `scrape_runs` row tracks the whole invocation.

use anyhow::Context;
use icpe_core::{AppConfig, FacilityReference};
use icpe_db::ScrapeRunTotals;
use icpe_scraper::{PageFetcher, RubriqueScraper, ScrapeStats};

use crate::fail_run_best_effort;

/// Effective settings for one `scrape` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScrapeOptions {
    pub chunk_size: usize,
    pub concurrency: usize,
    pub limit: Option<usize>,
    pub dry_run: bool,
}

impl ScrapeOptions {
    /// Applies command-line overrides on top of the configured defaults.
    pub(crate) fn resolve(
        config: &AppConfig,
        chunk_size: Option<usize>,
        concurrency: Option<usize>,
        limit: Option<usize>,
        dry_run: bool,
    ) -> Self {
        Self {
            chunk_size: chunk_size.unwrap_or(config.scraper_chunk_size).max(1),
            concurrency: concurrency.unwrap_or(config.scraper_max_concurrent).max(1),
            limit,
            dry_run,
        }
    }
}

#[derive(Debug, Default)]
struct ScrapeOutcome {
    stats: ScrapeStats,
    /// Rows written, or rows that would have been written on a dry run.
    rows_written: usize,
    chunks: usize,
}

/// Runs the enrichment over every facility with a detail URL.
///
/// With `dry_run` set, pages are fetched and parsed but nothing is written
/// and no run is recorded.
///
/// # Errors
///
/// Returns an error if the classification table or HTTP client cannot be
/// built, a page no longer has the expected structure, every fetch failed,
/// or a database operation fails. Once a run has started it is marked
/// `failed` before the error is returned.
pub(crate) async fn run_scrape(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    options: ScrapeOptions,
) -> anyhow::Result<()> {
    let table = icpe_core::load_classification_table(config)?;
    let fetcher = PageFetcher::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        options.concurrency,
    )
    .context("failed to build HTTP client")?;
    let scraper = RubriqueScraper::with_default_allow_list(fetcher, table);

    if options.dry_run {
        let outcome = run_chunks(pool, &scraper, options, None).await?;
        println!(
            "dry-run: {} facilities in {} chunks, {} fetched, {} failed, \
             {} rows would be written ({} classified)",
            outcome.stats.facilities,
            outcome.chunks,
            outcome.stats.fetched,
            outcome.stats.failed,
            outcome.rows_written,
            outcome.stats.classified,
        );
        return Ok(());
    }

    let run = icpe_db::create_scrape_run(pool, "cli").await?;
    if let Err(e) = icpe_db::start_scrape_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, &format!("{e:#}")).await;
        return Err(e.into());
    }
    let pending = pending_count(icpe_db::count_facilities(pool).await);
    tracing::info!(
        run_id = run.id,
        public_id = %run.public_id,
        facilities = ?pending,
        chunk_size = options.chunk_size,
        concurrency = options.concurrency,
        limit = ?options.limit,
        "scrape run started"
    );

    let outcome = match run_chunks(pool, &scraper, options, Some(run.id)).await {
        Ok(outcome) => outcome,
        Err(err) => {
            fail_run_best_effort(pool, run.id, &format!("{err:#}")).await;
            return Err(err);
        }
    };

    if outcome.stats.facilities > 0 && outcome.stats.fetched == 0 {
        let message = format!(
            "all {} facility pages failed to fetch",
            outcome.stats.facilities
        );
        fail_run_best_effort(pool, run.id, &message).await;
        anyhow::bail!("{message}");
    }

    if outcome.stats.failed > 0 {
        tracing::warn!(
            failed = outcome.stats.failed,
            total = outcome.stats.facilities,
            "some facility pages failed to fetch"
        );
    }

    let totals = ScrapeRunTotals {
        facilities_processed: outcome.stats.facilities,
        facilities_failed: outcome.stats.failed,
        rows_written: outcome.rows_written,
    };
    if let Err(err) = icpe_db::complete_scrape_run(pool, run.id, totals).await {
        fail_run_best_effort(pool, run.id, &format!("{err:#}")).await;
        return Err(err.into());
    }

    println!(
        "scrape run {} succeeded: {} facilities, {} failed, {} rows written ({} classified)",
        run.public_id,
        outcome.stats.facilities,
        outcome.stats.failed,
        outcome.rows_written,
        outcome.stats.classified,
    );

    Ok(())
}

/// Drives the chunk loop. `run_id` is `None` on a dry run, which skips writes.
async fn run_chunks(
    pool: &sqlx::PgPool,
    scraper: &RubriqueScraper,
    options: ScrapeOptions,
    run_id: Option<i64>,
) -> anyhow::Result<ScrapeOutcome> {
    let mut outcome = ScrapeOutcome::default();
    let mut cursor: Option<String> = None;
    let mut processed: usize = 0;

    while let Some(page_size) = next_page_size(options.chunk_size, options.limit, processed) {
        let limit = i64::try_from(page_size).context("chunk size does not fit in i64")?;
        let facilities = icpe_db::list_facilities_after(pool, cursor.as_deref(), limit).await?;
        let Some(last) = facilities.last() else {
            break;
        };
        cursor = Some(last.code_s3ic.clone());
        let page_len = facilities.len();
        processed += page_len;

        let references: Vec<FacilityReference> =
            facilities.into_iter().map(FacilityReference::from).collect();
        let batch = scraper
            .scrape_batch(&references)
            .await
            .with_context(|| format!("chunk {} aborted", outcome.chunks + 1))?;
        outcome.chunks += 1;
        outcome.stats.merge(&batch.stats);

        match run_id {
            Some(run_id) => {
                let written =
                    icpe_db::replace_rubriques(pool, run_id, &batch.fetched_ids, &batch.rows)
                        .await?;
                outcome.rows_written += usize::try_from(written).unwrap_or(usize::MAX);
            }
            None => outcome.rows_written += batch.rows.len(),
        }

        tracing::debug!(
            chunk = outcome.chunks,
            cursor = cursor.as_deref().unwrap_or_default(),
            facilities = page_len,
            rows = batch.rows.len(),
            "chunk complete"
        );

        if page_len < page_size {
            break;
        }
    }

    Ok(outcome)
}

/// Facility count for the start log. A failed count is logged, not fatal.
fn pending_count(result: Result<i64, icpe_db::DbError>) -> Option<i64> {
    result
        .inspect_err(|e| tracing::warn!(error = %e, "could not count facilities"))
        .ok()
}

/// Size of the next page to request, or `None` once `limit` is reached.
fn next_page_size(chunk_size: usize, limit: Option<usize>, processed: usize) -> Option<usize> {
    match limit {
        None => Some(chunk_size),
        Some(limit) => {
            let remaining = limit.saturating_sub(processed);
            (remaining > 0).then(|| remaining.min(chunk_size))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            database_url: "postgres://example".to_string(),
            env: icpe_core::Environment::Test,
            log_level: "info".to_string(),
            rubriques_path: None,
            db_max_connections: 10,
            db_min_connections: 1,
            db_acquire_timeout_secs: 10,
            scraper_request_timeout_secs: 30,
            scraper_user_agent: "ua".to_string(),
            scraper_max_concurrent: 5,
            scraper_chunk_size: 100,
        }
    }

    #[test]
    fn resolve_falls_back_to_config() {
        let options = ScrapeOptions::resolve(&config(), None, None, None, false);
        assert_eq!(
            options,
            ScrapeOptions {
                chunk_size: 100,
                concurrency: 5,
                limit: None,
                dry_run: false,
            }
        );
    }

    #[test]
    fn resolve_prefers_overrides_and_clamps_zero() {
        let options = ScrapeOptions::resolve(&config(), Some(0), Some(12), Some(250), true);
        assert_eq!(options.chunk_size, 1);
        assert_eq!(options.concurrency, 12);
        assert_eq!(options.limit, Some(250));
        assert!(options.dry_run);
    }

    #[test]
    fn pending_count_is_none_when_the_count_fails() {
        assert_eq!(pending_count(Ok(3)), Some(3));
        assert_eq!(pending_count(Err(icpe_db::DbError::NotFound)), None);
    }

    #[test]
    fn next_page_size_is_unbounded_without_limit() {
        assert_eq!(next_page_size(100, None, 0), Some(100));
        assert_eq!(next_page_size(100, None, 10_000), Some(100));
    }

    #[test]
    fn next_page_size_shrinks_to_the_remaining_limit() {
        assert_eq!(next_page_size(100, Some(250), 0), Some(100));
        assert_eq!(next_page_size(100, Some(250), 200), Some(50));
        assert_eq!(next_page_size(100, Some(250), 250), None);
        assert_eq!(next_page_size(100, Some(0), 0), None);
    }
}
