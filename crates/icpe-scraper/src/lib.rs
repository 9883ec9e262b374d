pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod page;
pub mod parse;
pub mod types;

pub use error::{ParseError, ScraperError};
pub use fetch::PageFetcher;
pub use orchestrator::{RubriqueScraper, ScrapeBatch};
pub use page::FacilityPage;
pub use parse::{locate_table, parse_entries, SITUATION_HEADING};
pub use types::{FetchResult, ScrapeStats};
