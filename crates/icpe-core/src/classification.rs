//! Rubrique classification table and lookup.
//!
//! The table maps a rubrique code to the waste-handling role of a facility
//! (`Category`) and the hazard class of the waste it handles (`WasteType`).
//! Some codes classify directly; others differentiate by alinéa (sub-code)
//! and store one entry per alinéa.
//!
//! The reference table ships embedded in the binary as
//! `data/rubriques.json` and can be replaced at startup by a file with the
//! same shape:
//!
//! ```json
//! {
//!   "2715": { "category": "COLLECTOR", "waste_type": "NOT_DANGEROUS" },
//!   "2710": { "1a": { "category": "WASTE_CENTER", "waste_type": "DANGEROUS" } }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const EMBEDDED_TABLE: &str = include_str!("../data/rubriques.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Collector,
    WasteCenter,
    WasteVehicles,
    #[serde(rename = "WASTEPROCESSOR")]
    WasteProcessor,
}

impl Category {
    /// Wire name, as stored in the `rubriques.category` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Collector => "COLLECTOR",
            Category::WasteCenter => "WASTE_CENTER",
            Category::WasteVehicles => "WASTE_VEHICLES",
            Category::WasteProcessor => "WASTEPROCESSOR",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WasteType {
    Dangerous,
    NotDangerous,
    Inerte,
}

impl WasteType {
    /// Wire name, as stored in the `rubriques.waste_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            WasteType::Dangerous => "DANGEROUS",
            WasteType::NotDangerous => "NOT_DANGEROUS",
            WasteType::Inerte => "INERTE",
        }
    }
}

impl std::fmt::Display for WasteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The (category, waste type) pair attached to a classified rubrique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Classification {
    pub category: Category,
    pub waste_type: WasteType,
}

impl Classification {
    #[must_use]
    pub const fn new(category: Category, waste_type: WasteType) -> Self {
        Self {
            category,
            waste_type,
        }
    }
}

/// One flattened row of the table, mainly for listing and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationEntry {
    pub code: String,
    pub sub_code: Option<String>,
    pub classification: Classification,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RubriqueNode {
    Direct(Classification),
    BySubCode(BTreeMap<String, Classification>),
}

/// Immutable code → classification lookup, built once at startup.
#[derive(Debug, Clone)]
pub struct ClassificationTable {
    nodes: BTreeMap<String, RubriqueNode>,
}

impl ClassificationTable {
    /// Parses the table embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the embedded resource is malformed.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_json_str(EMBEDDED_TABLE)
    }

    /// Reads and validates a table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ClassificationFileIo`] if the file cannot be read,
    /// or the parse/validation errors of [`Self::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ClassificationFileIo {
                path: path.display().to_string(),
                source: e,
            })?;
        Self::from_json_str(&content)
    }

    /// Parses and validates a table from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ClassificationParse`] if the document does not
    /// match the expected shape (including unknown category or waste type
    /// names), or [`ConfigError::Validation`] for empty codes, empty sub-code
    /// maps, or empty sub-codes.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let nodes: BTreeMap<String, RubriqueNode> =
            serde_json::from_str(json).map_err(ConfigError::ClassificationParse)?;
        let table = Self { nodes };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (code, node) in &self.nodes {
            if code.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "rubrique code must be non-empty".to_string(),
                ));
            }
            if let RubriqueNode::BySubCode(by_sub_code) = node {
                if by_sub_code.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "rubrique '{code}' has an empty sub-code mapping"
                    )));
                }
                if by_sub_code.keys().any(|k| k.trim().is_empty()) {
                    return Err(ConfigError::Validation(format!(
                        "rubrique '{code}' has an empty sub-code key"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Looks up the classification for `code` and optional `sub_code`.
    ///
    /// - Unknown code → `None`.
    /// - Code classified directly → that classification; `sub_code` is ignored.
    /// - Code split by sub-code → the entry for `sub_code`, or `None` when
    ///   `sub_code` is missing or unknown. No default alinéa is guessed.
    #[must_use]
    pub fn classify(&self, code: &str, sub_code: Option<&str>) -> Option<Classification> {
        match self.nodes.get(code)? {
            RubriqueNode::Direct(classification) => Some(*classification),
            RubriqueNode::BySubCode(by_sub_code) => by_sub_code.get(sub_code?).copied(),
        }
    }

    #[must_use]
    pub fn contains_code(&self, code: &str) -> bool {
        self.nodes.contains_key(code)
    }

    /// Number of distinct rubrique codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All entries, ordered by code then sub-code.
    pub fn entries(&self) -> impl Iterator<Item = ClassificationEntry> + '_ {
        self.nodes.iter().flat_map(|(code, node)| {
            let flattened: Vec<ClassificationEntry> = match node {
                RubriqueNode::Direct(classification) => vec![ClassificationEntry {
                    code: code.clone(),
                    sub_code: None,
                    classification: *classification,
                }],
                RubriqueNode::BySubCode(by_sub_code) => by_sub_code
                    .iter()
                    .map(|(sub_code, classification)| ClassificationEntry {
                        code: code.clone(),
                        sub_code: Some(sub_code.clone()),
                        classification: *classification,
                    })
                    .collect(),
            };
            flattened
        })
    }
}

#[cfg(test)]
#[path = "classification_test.rs"]
mod tests;
