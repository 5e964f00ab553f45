//! Configuration constants for the eligibility engine
//!
//! Centralized values used throughout the engine for:
//! - Resource limits on loaded rule documents and candidate pools
//! - Recursion depth limits (prevent stack overflow)
//! - Well-known property names and status codes of the rule tree format
//!
//! The global license-level ranking is runtime configuration and lives in
//! [`crate::levels::LevelCatalog`].

/// Maximum rule document size in bytes (1 MB).
///
/// A condition tree for a single permit type is a few KB; anything larger
/// is rejected before parsing.
pub const MAX_DOCUMENT_SIZE: usize = 1_000_000;

/// Maximum nesting depth of a rule tree.
///
/// Evaluation recurses once per level.
pub const MAX_TREE_DEPTH: usize = 64;

/// Maximum number of children of a single block.
pub const MAX_CHILDREN: usize = 1_000;

/// Maximum number of candidate engineers in a single evaluation.
pub const MAX_POOL_SIZE: usize = 10_000;

/// License status code of an active license.
pub const ACTIVE_LICENSE_STATUS: &str = "ACTIVE";

/// Block property holding the composition operator.
pub const CONDITION_PROPERTY: &str = "condition";

/// EngineerItem property holding the area covered by one engineer.
pub const METERAGE_PROPERTY: &str = "refTotalMeterage";

/// EngineerItem property holding the required license level.
pub const LICENSE_LEVEL_PROPERTY: &str = "refLicenseLevel";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_reasonable() {
        assert!(MAX_DOCUMENT_SIZE >= 100_000, "Should allow at least 100KB");
        assert!(MAX_DOCUMENT_SIZE <= 10_000_000, "Should not allow 10MB+");

        assert!(MAX_TREE_DEPTH >= 8, "Should allow reasonable nesting");
        assert!(MAX_TREE_DEPTH <= 256, "Should limit deep nesting");

        assert!(MAX_CHILDREN >= 100, "Should allow wide blocks");
        assert!(MAX_POOL_SIZE >= 1_000, "Should allow city-sized pools");
    }

    #[test]
    fn test_property_names_match_tree_format() {
        assert_eq!(CONDITION_PROPERTY, "condition");
        assert_eq!(METERAGE_PROPERTY, "refTotalMeterage");
        assert_eq!(LICENSE_LEVEL_PROPERTY, "refLicenseLevel");
    }
}
