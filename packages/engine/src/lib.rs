//! Engineer Eligibility Engine
//!
//! Decides whether a pool of licensed engineers can staff a building-permit
//! project under a configurable rule tree. This library provides
//! functionality for:
//! - Loading rule trees ("condition blocks") from YAML or JSON
//! - Validating trees structurally before they are evaluated
//! - Evaluating AND/OR blocks and per-discipline quotas against an engineer pool
//! - Recording evaluation traces for audit and debugging
//!
//! # Example
//!
//! ```ignore
//! use eligibility_engine::{EligibilityEvaluator, EvaluationMode, Project, RuleNode};
//!
//! let tree = RuleNode::from_yaml_file("rules/residential.yaml")?;
//! let evaluator = EligibilityEvaluator::new(chrono::Local::now().date_naive());
//!
//! let result = evaluator.evaluate(
//!     &Project::new(250.0),
//!     &tree,
//!     &engineers,
//!     EvaluationMode::CheckEngineers,
//! );
//! for engineer in &result.selected_engineers {
//!     println!("{}", engineer.id);
//! }
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod levels;
pub mod roster;
pub mod trace;
pub mod tree;
pub mod types;

// Re-export commonly used items
pub use context::EvaluationContext;
pub use engine::{EligibilityEvaluator, EligibilityResult};
pub use error::{EngineError, Result, StructuralIssue, StructuralIssueKind};
pub use levels::{accepted_levels, LevelCatalog};
pub use roster::{parse_evaluation_date, Engineer, EngineerLicense, Project};
pub use trace::{PathNode, TraceBuilder};
pub use tree::{BlockNode, EngineerItemNode, Property, RuleNode};
pub use types::{
    Condition, EvaluationMode, LevelOption, LevelSelection, PathNodeType, PropertyValue,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
