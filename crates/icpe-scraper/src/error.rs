use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse detail page for facility {facility_id}: {source}")]
    Parse {
        facility_id: String,
        #[source]
        source: ParseError,
    },
}

/// Structural failures of the detail-page parser.
///
/// All of these abort the batch: either the parser was driven out of order,
/// or the page no longer has the layout the parser expects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("HTML not set: the page was not fetched successfully")]
    HtmlNotSet,

    #[error("document not set: parse() must run before find_rubriques()")]
    DocumentNotSet,

    #[error("heading \"{0}\" not found")]
    HeadingNotFound(String),

    #[error("no table follows heading \"{0}\"")]
    TableNotFound(String),

    #[error("rubrique table has no \"{0}\" column")]
    MissingColumn(String),
}
