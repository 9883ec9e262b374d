//! Stateful wrapper around one facility's detail page.
//!
//! A page goes through three steps: HTML set (from a successful fetch),
//! parsed into a document, then searched for rubriques. Calling a step before
//! the previous one has happened is an error, never a silent no-op.

use scraper::Html;

use icpe_core::RegulatoryEntry;

use crate::error::ParseError;
use crate::parse::entries_from_document;
use crate::types::FetchResult;

pub struct FacilityPage {
    facility_id: String,
    html: Option<String>,
    document: Option<Html>,
}

impl FacilityPage {
    #[must_use]
    pub fn new(facility_id: impl Into<String>) -> Self {
        Self {
            facility_id: facility_id.into(),
            html: None,
            document: None,
        }
    }

    /// Builds a page from a fetch outcome; a failed fetch leaves the HTML unset.
    #[must_use]
    pub fn from_fetch(result: FetchResult) -> Self {
        Self {
            facility_id: result.facility_id,
            html: result.raw_html,
            document: None,
        }
    }

    #[must_use]
    pub fn facility_id(&self) -> &str {
        &self.facility_id
    }

    #[must_use]
    pub fn has_html(&self) -> bool {
        self.html.is_some()
    }

    /// Replaces the page HTML and discards any previously parsed document.
    pub fn set_html(&mut self, html: String) {
        self.html = Some(html);
        self.document = None;
    }

    /// Parses the HTML into a document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::HtmlNotSet`] if no HTML was provided.
    pub fn parse(&mut self) -> Result<(), ParseError> {
        let html = self.html.as_deref().ok_or(ParseError::HtmlNotSet)?;
        self.document = Some(Html::parse_document(html));
        Ok(())
    }

    /// Extracts the rubrique entries from the parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::DocumentNotSet`] if [`Self::parse`] has not run,
    /// or the structural errors of [`crate::parse::parse_entries`].
    pub fn find_rubriques(&self) -> Result<Vec<RegulatoryEntry>, ParseError> {
        let document = self.document.as_ref().ok_or(ParseError::DocumentNotSet)?;
        entries_from_document(document)
    }
}

impl std::fmt::Debug for FacilityPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilityPage")
            .field("facility_id", &self.facility_id)
            .field("html_len", &self.html.as_ref().map(String::len))
            .field("parsed", &self.document.is_some())
            .finish()
    }
}
