use thiserror::Error;

pub mod app_config;
pub mod classification;
pub mod config;
pub mod facility;
pub mod rubriques;

pub use app_config::{AppConfig, Environment};
pub use classification::{
    Category, Classification, ClassificationEntry, ClassificationTable, WasteType,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use facility::{FacilityReference, OutputRow, RegulatoryEntry};
pub use rubriques::{is_relevant, RELEVANT_RUBRIQUES};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read classification table {path}: {source}")]
    ClassificationFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse classification table: {0}")]
    ClassificationParse(#[source] serde_json::Error),

    #[error("invalid classification table: {0}")]
    Validation(String),
}

/// Loads the classification table named by the config, or the embedded one.
///
/// # Errors
///
/// Returns [`ConfigError`] if the table cannot be read or fails validation.
pub fn load_classification_table(config: &AppConfig) -> Result<ClassificationTable, ConfigError> {
    match &config.rubriques_path {
        Some(path) => ClassificationTable::load(path),
        None => ClassificationTable::embedded(),
    }
}
