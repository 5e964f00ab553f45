//! Core types for the eligibility engine

use serde::{Deserialize, Serialize};

/// Value of a named rule node property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// String value
    Text(String),
    /// Ordered option list
    Options(Vec<LevelOption>),
    /// Ordered option list with the currently selected entry
    Level(LevelSelection),
}

impl PropertyValue {
    /// Try to get value as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get value as f64
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get value as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get value as a plain option list
    pub fn as_options(&self) -> Option<&[LevelOption]> {
        match self {
            PropertyValue::Options(options) => Some(options),
            _ => None,
        }
    }

    /// Try to get value as a level selection
    pub fn as_level(&self) -> Option<&LevelSelection> {
        match self {
            PropertyValue::Level(level) => Some(level),
            _ => None,
        }
    }

    /// Name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "boolean",
            PropertyValue::Number(_) => "number",
            PropertyValue::Text(_) => "string",
            PropertyValue::Options(_) => "option list",
            PropertyValue::Level(_) => "level selection",
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<i32> for PropertyValue {
    fn from(n: i32) -> Self {
        PropertyValue::Number(n as f64)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<Vec<LevelOption>> for PropertyValue {
    fn from(options: Vec<LevelOption>) -> Self {
        PropertyValue::Options(options)
    }
}

impl From<LevelSelection> for PropertyValue {
    fn from(level: LevelSelection) -> Self {
        PropertyValue::Level(level)
    }
}

/// One entry of a license-level option list.
///
/// Lower `order` means a more senior level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelOption {
    pub value: String,
    pub order: i64,
}

impl LevelOption {
    pub fn new(value: impl Into<String>, order: i64) -> Self {
        Self {
            value: value.into(),
            order,
        }
    }
}

/// The `refLicenseLevel` property: an option list plus the level it pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSelection {
    pub selected: String,
    #[serde(default)]
    pub options: Vec<LevelOption>,
}

impl LevelSelection {
    pub fn new(selected: impl Into<String>, options: Vec<LevelOption>) -> Self {
        Self {
            selected: selected.into(),
            options,
        }
    }
}

/// Composition operator of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    And,
    Or,
}

impl Condition {
    /// Parse an operator name, ignoring ASCII case.
    pub fn parse(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("and") {
            Some(Condition::And)
        } else if value.trim().eq_ignore_ascii_case("or") {
            Some(Condition::Or)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::And => "and",
            Condition::Or => "or",
        }
    }
}

/// Selects the satisfaction predicate applied to engineer items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationMode {
    /// Staff list is still being assembled: matches may not exceed the quota
    ModifyEngineers,
    /// Staff list is committed: matches must equal the quota and cover the pool
    CheckEngineers,
}

impl EvaluationMode {
    /// Whether `matched` engineers satisfy a quota of `required` in this mode.
    pub fn accepts(&self, matched: usize, required: usize) -> bool {
        match self {
            EvaluationMode::ModifyEngineers => matched <= required,
            EvaluationMode::CheckEngineers => matched == required,
        }
    }
}

/// Node type in an evaluation trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathNodeType {
    /// Whole evaluation, including the pool coverage check
    Evaluation,
    Block,
    EngineerItem,
}
