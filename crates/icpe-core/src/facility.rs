//! Facility and regulatory-entry records flowing through the enrichment step.

use serde::{Deserialize, Serialize};

use crate::classification::{Category, Classification, WasteType};

/// A facility to enrich: its S3IC identifier and Géorisques detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityReference {
    pub facility_id: String,
    pub detail_url: String,
}

impl FacilityReference {
    #[must_use]
    pub fn new(facility_id: impl Into<String>, detail_url: impl Into<String>) -> Self {
        Self {
            facility_id: facility_id.into(),
            detail_url: detail_url.into(),
        }
    }
}

/// One row of a facility's "Situation administrative" table.
///
/// Values are kept exactly as they appear in the page, whitespace included.
/// Optional fields are `None` only when the column is absent from the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulatoryEntry {
    pub code: String,
    pub sub_code: Option<String>,
    pub authorization_date: String,
    pub activity_status: String,
    pub authorization_regime: String,
    pub activity_description: String,
    pub volume: Option<String>,
    pub unit: Option<String>,
}

/// An allow-listed entry tagged with its facility, ready for the sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRow {
    pub facility_id: String,
    pub code: String,
    pub sub_code: Option<String>,
    pub authorization_date: String,
    pub activity_status: String,
    pub authorization_regime: String,
    pub activity_description: String,
    pub volume: Option<String>,
    pub unit: Option<String>,
    pub category: Option<Category>,
    pub waste_type: Option<WasteType>,
}

impl OutputRow {
    #[must_use]
    pub fn from_entry(
        facility_id: &str,
        entry: RegulatoryEntry,
        classification: Option<Classification>,
    ) -> Self {
        Self {
            facility_id: facility_id.to_owned(),
            code: entry.code,
            sub_code: entry.sub_code,
            authorization_date: entry.authorization_date,
            activity_status: entry.activity_status,
            authorization_regime: entry.authorization_regime,
            activity_description: entry.activity_description,
            volume: entry.volume,
            unit: entry.unit,
            category: classification.map(|c| c.category),
            waste_type: classification.map(|c| c.waste_type),
        }
    }

    #[must_use]
    pub fn is_classified(&self) -> bool {
        self.category.is_some()
    }
}
