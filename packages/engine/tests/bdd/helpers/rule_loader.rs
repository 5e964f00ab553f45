//! Rule tree loader for BDD tests
//!
//! Loads all YAML rule trees from the repository's `rules/` directory.

use eligibility_engine::{EngineError, RuleNode};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn rules_dir() -> Option<PathBuf> {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .parent() // packages/
        .and_then(|p| p.parent()) // project root
        .map(|p| p.join("rules"))
}

/// Load every rule tree under `rules/`, keyed by root node id.
///
/// Files that fail to parse are skipped with a warning so one broken
/// document does not hide the others.
pub fn load_all_rule_trees() -> Result<HashMap<String, RuleNode>, EngineError> {
    let rules_dir = rules_dir()
        .ok_or_else(|| EngineError::LoadError("Could not find rules directory".to_string()))?;

    if !rules_dir.exists() {
        return Err(EngineError::LoadError(format!(
            "Rules directory not found: {}",
            rules_dir.display()
        )));
    }

    let mut trees = HashMap::new();

    for entry in WalkDir::new(&rules_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if path.is_file() && path.extension().is_some_and(|ext| ext == "yaml") {
            match RuleNode::from_yaml_file(path) {
                Ok(tree) => {
                    tracing::debug!(root = %tree.id(), path = %path.display(), "Loaded rule tree");
                    trees.insert(tree.id().to_string(), tree);
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to load rule tree (skipping)"
                    );
                }
            }
        }
    }

    tracing::info!(count = trees.len(), "Loaded rule trees");
    Ok(trees)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::load_all_rule_trees;

    #[test]
    fn test_bundled_rule_trees_are_well_formed() {
        let trees = load_all_rule_trees().expect("Failed to load rule trees");
        assert!(trees.contains_key("residential"));
        for (id, tree) in &trees {
            let issues = tree.validate(None);
            assert!(issues.is_empty(), "{id} has issues: {issues:?}");
        }
    }
}
