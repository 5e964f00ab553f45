//! License level resolution
//!
//! License levels form a seniority ranking: each option carries an `order`,
//! and a lower order is a more senior level. A requirement pinned at some
//! level is met by that level and by every more senior one.
//!
//! # Example
//!
//! ```ignore
//! use eligibility_engine::{accepted_levels, LevelOption};
//!
//! let options = vec![
//!     LevelOption::new("senior", 1),
//!     LevelOption::new("grade-1", 2),
//!     LevelOption::new("grade-2", 3),
//! ];
//! let accepted = accepted_levels(&options, "grade-1");
//! assert!(accepted.contains("senior"));
//! assert!(!accepted.contains("grade-2"));
//! ```

use crate::config;
use crate::error::{EngineError, Result};
use crate::types::LevelOption;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Compute the set of level values that satisfy a requirement pinned at `selected`.
///
/// Options are ranked ascending by `order`; the result is every option whose
/// order is at or below that of the option matching `selected`. An unknown
/// `selected` value yields an empty set, so the requirement can never be met.
pub fn accepted_levels(options: &[LevelOption], selected: &str) -> HashSet<String> {
    let Some(pinned) = options.iter().find(|option| option.value == selected) else {
        return HashSet::new();
    };

    let mut ranked: Vec<&LevelOption> = options.iter().collect();
    ranked.sort_by_key(|option| option.order);

    ranked
        .into_iter()
        .take_while(|option| option.order <= pinned.order)
        .map(|option| option.value.clone())
        .collect()
}

/// Globally ordered list of license levels.
///
/// Loaded once from configuration and shared by reference between
/// evaluations. When a catalog is handed to the evaluator, accepted level
/// sets are cut from this ordering instead of each node's own option list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelCatalog {
    levels: Vec<LevelOption>,
}

impl LevelCatalog {
    /// Build a catalog from options in any order.
    pub fn new(mut levels: Vec<LevelOption>) -> Result<Self> {
        levels.sort_by_key(|option| option.order);

        let mut seen = HashSet::new();
        for option in &levels {
            if !seen.insert(option.value.as_str()) {
                return Err(EngineError::LoadError(format!(
                    "Duplicate license level '{}' in catalog",
                    option.value
                )));
            }
        }

        Ok(Self { levels })
    }

    /// Parse a catalog from YAML of the form `levels: [{value, order}, ...]`.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        check_document_size(content)?;
        let raw: LevelCatalog = serde_yaml_ng::from_str(content)?;
        let catalog = Self::new(raw.levels)?;
        tracing::debug!(levels = catalog.levels.len(), "Loaded license level catalog");
        Ok(catalog)
    }

    /// Parse a catalog from JSON of the same shape as [`Self::from_yaml_str`].
    pub fn from_json_str(content: &str) -> Result<Self> {
        check_document_size(content)?;
        let raw: LevelCatalog = serde_json::from_str(content)?;
        Self::new(raw.levels)
    }

    /// Levels ranked from most to least senior.
    pub fn levels(&self) -> &[LevelOption] {
        &self.levels
    }

    pub fn contains(&self, value: &str) -> bool {
        self.levels.iter().any(|option| option.value == value)
    }

    /// Accepted level set for a requirement pinned at `selected`.
    pub fn accepted(&self, selected: &str) -> HashSet<String> {
        accepted_levels(&self.levels, selected)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

fn check_document_size(content: &str) -> Result<()> {
    if content.len() > config::MAX_DOCUMENT_SIZE {
        tracing::warn!(
            size = content.len(),
            max = config::MAX_DOCUMENT_SIZE,
            "Level catalog exceeds size limit"
        );
        return Err(EngineError::LimitExceeded {
            what: "level catalog".to_string(),
            actual: content.len(),
            max: config::MAX_DOCUMENT_SIZE,
        });
    }
    Ok(())
}
