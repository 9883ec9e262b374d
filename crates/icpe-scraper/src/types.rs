/// Outcome of fetching one facility's detail page.
///
/// `raw_html` is `Some` exactly when `failed` is `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub facility_id: String,
    pub raw_html: Option<String>,
    pub failed: bool,
}

impl FetchResult {
    #[must_use]
    pub fn fetched(facility_id: &str, raw_html: String) -> Self {
        Self {
            facility_id: facility_id.to_owned(),
            raw_html: Some(raw_html),
            failed: false,
        }
    }

    #[must_use]
    pub fn failed(facility_id: &str) -> Self {
        Self {
            facility_id: facility_id.to_owned(),
            raw_html: None,
            failed: true,
        }
    }
}

/// Counters for one orchestrator call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeStats {
    pub facilities: usize,
    pub fetched: usize,
    pub failed: usize,
    pub entries_parsed: usize,
    pub entries_kept: usize,
    pub classified: usize,
}

impl ScrapeStats {
    /// Adds `other` into `self`, for totals across chunks.
    pub fn merge(&mut self, other: &ScrapeStats) {
        self.facilities += other.facilities;
        self.fetched += other.fetched;
        self.failed += other.failed;
        self.entries_parsed += other.entries_parsed;
        self.entries_kept += other.entries_kept;
        self.classified += other.classified;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_result_has_no_html() {
        let result = FetchResult::failed("0001.00001");
        assert!(result.failed);
        assert!(result.raw_html.is_none());
    }

    #[test]
    fn merge_sums_every_counter() {
        let mut total = ScrapeStats {
            facilities: 2,
            fetched: 1,
            failed: 1,
            entries_parsed: 4,
            entries_kept: 2,
            classified: 1,
        };
        total.merge(&ScrapeStats {
            facilities: 3,
            fetched: 3,
            failed: 0,
            entries_parsed: 5,
            entries_kept: 3,
            classified: 3,
        });
        assert_eq!(
            total,
            ScrapeStats {
                facilities: 5,
                fetched: 4,
                failed: 1,
                entries_parsed: 9,
                entries_kept: 5,
                classified: 4,
            }
        );
    }
}
