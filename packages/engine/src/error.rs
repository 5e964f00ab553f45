//! Error types for the eligibility engine

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to load or parse a rule document
    #[error("Failed to load rule document: {0}")]
    LoadError(String),

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The rule tree is not well-formed; evaluation is inconclusive
    #[error("Malformed rule tree: {}", format_issues(.0))]
    Malformed(Vec<StructuralIssue>),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// An input exceeded one of the configured limits
    #[error("{what} exceeds limit ({actual}, max {max})")]
    LimitExceeded {
        what: String,
        actual: usize,
        max: usize,
    },
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// A configuration defect in one node of a rule tree.
///
/// Issues are data, not errors: the evaluator folds them into its result so
/// callers can tell a broken rule tree apart from a project that simply does
/// not qualify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralIssue {
    pub node_id: String,
    pub kind: StructuralIssueKind,
}

impl StructuralIssue {
    pub fn new(node_id: impl Into<String>, kind: StructuralIssueKind) -> Self {
        Self {
            node_id: node_id.into(),
            kind,
        }
    }
}

impl fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node '{}': {}", self.node_id, self.kind)
    }
}

/// Categories of structural defects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuralIssueKind {
    /// Block without a `condition` property
    MissingCondition,
    /// Block whose `condition` is neither `and` nor `or`
    UnknownCondition { value: String },
    /// EngineerItem without a `refTotalMeterage` property
    MissingMeterage,
    /// `refTotalMeterage` is zero, negative or not finite
    InvalidMeterage { value: f64 },
    /// EngineerItem without a `refLicenseLevel` property
    MissingLicenseLevel,
    /// `refLicenseLevel` carries no options
    EmptyLevelOptions,
    /// The selected level is absent from the option list it is ranked against
    UnknownLevel { value: String },
    /// A required property holds a value of the wrong type
    WrongPropertyType {
        property: String,
        expected: String,
    },
    /// The tree nests deeper than the configured limit
    TooDeep { depth: usize },
    /// A block has more children than the configured limit
    TooManyChildren { count: usize },
}

impl fmt::Display for StructuralIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCondition => write!(f, "block has no 'condition' property"),
            Self::UnknownCondition { value } => {
                write!(f, "unknown condition operator '{}'", value)
            }
            Self::MissingMeterage => write!(f, "engineer item has no 'refTotalMeterage'"),
            Self::InvalidMeterage { value } => {
                write!(f, "refTotalMeterage must be positive, got {}", value)
            }
            Self::MissingLicenseLevel => write!(f, "engineer item has no 'refLicenseLevel'"),
            Self::EmptyLevelOptions => write!(f, "refLicenseLevel has no options"),
            Self::UnknownLevel { value } => {
                write!(f, "license level '{}' is not in the option list", value)
            }
            Self::WrongPropertyType { property, expected } => {
                write!(f, "property '{}' must be a {}", property, expected)
            }
            Self::TooDeep { depth } => write!(f, "tree depth {} exceeds limit", depth),
            Self::TooManyChildren { count } => {
                write!(f, "{} children exceed limit", count)
            }
        }
    }
}

fn format_issues(issues: &[StructuralIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
