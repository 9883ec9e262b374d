//! Batch orchestration: fetch, parse, filter, classify.

use std::collections::HashSet;

use icpe_core::{ClassificationTable, FacilityReference, OutputRow, RELEVANT_RUBRIQUES};

use crate::error::ScraperError;
use crate::fetch::PageFetcher;
use crate::page::FacilityPage;
use crate::types::{FetchResult, ScrapeStats};

/// Rows produced for one batch, with the counters that led to them.
#[derive(Debug, Clone, Default)]
pub struct ScrapeBatch {
    pub rows: Vec<OutputRow>,
    /// Facilities whose page was fetched and parsed, in input order. Only
    /// these have an authoritative (possibly empty) set of rows.
    pub fetched_ids: Vec<String>,
    pub stats: ScrapeStats,
}

/// Enriches batches of facilities with their classified rubriques.
///
/// Each call to [`Self::scrape_batch`] issues one bounded fetch for the whole
/// batch, then parses and classifies synchronously once every fetch has
/// finished. Callers chunk large inputs and invoke it repeatedly.
#[derive(Debug, Clone)]
pub struct RubriqueScraper {
    fetcher: PageFetcher,
    table: ClassificationTable,
    allowed: HashSet<String>,
}

impl RubriqueScraper {
    pub fn new<I, S>(fetcher: PageFetcher, table: ClassificationTable, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fetcher,
            table,
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Uses [`RELEVANT_RUBRIQUES`] as the allow-list.
    #[must_use]
    pub fn with_default_allow_list(fetcher: PageFetcher, table: ClassificationTable) -> Self {
        Self::new(fetcher, table, RELEVANT_RUBRIQUES.iter().copied())
    }

    #[must_use]
    pub fn table(&self) -> &ClassificationTable {
        &self.table
    }

    /// Fetches, parses, filters and classifies one batch of facilities.
    ///
    /// Output rows follow input order: facility by facility, then in the
    /// order of the facility's rubrique table. A facility whose fetch failed
    /// contributes no rows.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Parse`] when a fetched page lacks the expected
    /// heading, table, or code column. The whole batch is abandoned.
    pub async fn scrape_batch(
        &self,
        batch: &[FacilityReference],
    ) -> Result<ScrapeBatch, ScraperError> {
        let results = self.fetcher.fetch_all(batch).await;
        let scraped = self.collect_rows(results)?;

        tracing::info!(
            facilities = scraped.stats.facilities,
            failed = scraped.stats.failed,
            entries_parsed = scraped.stats.entries_parsed,
            entries_kept = scraped.stats.entries_kept,
            classified = scraped.stats.classified,
            "scraped facility batch"
        );
        Ok(scraped)
    }

    fn collect_rows(&self, results: Vec<FetchResult>) -> Result<ScrapeBatch, ScraperError> {
        let mut batch = ScrapeBatch::default();
        batch.stats.facilities = results.len();

        for result in results {
            if result.failed {
                batch.stats.failed += 1;
                continue;
            }
            batch.stats.fetched += 1;

            let mut page = FacilityPage::from_fetch(result);
            let entries = page
                .parse()
                .and_then(|()| page.find_rubriques())
                .map_err(|source| ScraperError::Parse {
                    facility_id: page.facility_id().to_owned(),
                    source,
                })?;
            batch.stats.entries_parsed += entries.len();
            batch.fetched_ids.push(page.facility_id().to_owned());

            for entry in entries {
                if !self.allowed.contains(&entry.code) {
                    continue;
                }
                let classification = self.table.classify(&entry.code, entry.sub_code.as_deref());
                if classification.is_some() {
                    batch.stats.classified += 1;
                }
                batch.stats.entries_kept += 1;
                batch
                    .rows
                    .push(OutputRow::from_entry(page.facility_id(), entry, classification));
            }
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <h2>Situation administrative</h2>
        <table>
          <tr><th>Rubri. IC</th><th>Ali.</th><th>Date auto.</th><th>Etat d'activité</th>
              <th>Régime autorisé(3)</th><th>Activité</th><th>Volume</th><th>Unité</th></tr>
          <tr><td>1510</td><td>2</td><td>01/01/2010</td><td>En fonct.</td>
              <td>Enregistrement</td><td>Entrepôts couverts</td><td>50000</td><td>m3</td></tr>
          <tr><td>2716</td><td>3</td><td>01/01/2010</td><td>En fonct.</td>
              <td>Déclaration</td><td>Transit de déchets</td><td>800</td><td>m3</td></tr>
          <tr><td>2710</td><td>1a</td><td>01/01/2010</td><td>En fonct.</td>
              <td>Autorisation</td><td>Déchèterie</td><td>8</td><td>t</td></tr>
        </table>
    </body></html>"#;

    fn scraper() -> RubriqueScraper {
        let fetcher = PageFetcher::with_client(reqwest::Client::new(), 5);
        RubriqueScraper::with_default_allow_list(
            fetcher,
            ClassificationTable::embedded().unwrap(),
        )
    }

    #[test]
    fn collect_rows_filters_and_classifies_in_source_order() {
        let batch = scraper()
            .collect_rows(vec![
                FetchResult::fetched("0001.00001", PAGE.to_string()),
                FetchResult::failed("0001.00002"),
            ])
            .unwrap();

        let codes: Vec<&str> = batch.rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["2716", "2710"]);
        assert!(batch.rows.iter().all(|r| r.facility_id == "0001.00001"));
        assert_eq!(batch.fetched_ids, vec!["0001.00001"]);

        // 2716 alinéa 3 has no classification but is still emitted.
        assert!(batch.rows[0].category.is_none());
        assert_eq!(
            batch.rows[1].category,
            Some(icpe_core::Category::WasteCenter)
        );

        assert_eq!(
            batch.stats,
            ScrapeStats {
                facilities: 2,
                fetched: 1,
                failed: 1,
                entries_parsed: 3,
                entries_kept: 2,
                classified: 1,
            }
        );
    }

    #[test]
    fn collect_rows_aborts_on_missing_heading() {
        let err = scraper()
            .collect_rows(vec![FetchResult::fetched(
                "0001.00003",
                "<html><body><h2>Autre</h2></body></html>".to_string(),
            )])
            .unwrap_err();

        assert!(
            matches!(
                err,
                ScraperError::Parse { ref facility_id, source: crate::ParseError::HeadingNotFound(_) }
                    if facility_id == "0001.00003"
            ),
            "expected Parse(HeadingNotFound), got: {err:?}"
        );
    }

    #[test]
    fn custom_allow_list_replaces_default() {
        let fetcher = PageFetcher::with_client(reqwest::Client::new(), 5);
        let scraper = RubriqueScraper::new(
            fetcher,
            ClassificationTable::embedded().unwrap(),
            ["1510"],
        );
        let batch = scraper
            .collect_rows(vec![FetchResult::fetched("0001.00001", PAGE.to_string())])
            .unwrap();

        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].code, "1510");
        assert!(batch.rows[0].waste_type.is_none());
    }
}
