//! World struct for Cucumber BDD tests
//!
//! Contains the test state that persists across steps in a scenario.

use chrono::NaiveDate;
use cucumber::World;
use eligibility_engine::{
    EligibilityEvaluator, EligibilityResult, Engineer, EvaluationMode, LevelCatalog, Project,
    RuleNode,
};
use std::collections::HashMap;
use std::fmt;

use crate::helpers::rule_loader::load_all_rule_trees;

/// Test world that holds state across steps in a Cucumber scenario.
#[derive(World)]
#[world(init = Self::new)]
pub struct EligibilityWorld {
    /// Rule trees from `rules/`, keyed by root id
    pub rule_trees: HashMap<String, RuleNode>,
    /// Tree under evaluation in the current scenario
    pub tree: Option<RuleNode>,
    /// Date licenses are checked against
    pub evaluation_date: NaiveDate,
    pub project: Project,
    pub engineers: Vec<Engineer>,
    /// Discipline allow-list (empty allows all)
    pub allowed_disciplines: Vec<String>,
    pub catalog: Option<LevelCatalog>,
    /// Last evaluation result
    pub result: Option<EligibilityResult>,
}

impl fmt::Debug for EligibilityWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EligibilityWorld")
            .field("tree", &self.tree.as_ref().map(|t| t.id().to_string()))
            .field("evaluation_date", &self.evaluation_date)
            .field("project", &self.project)
            .field("engineers", &self.engineers)
            .field("allowed_disciplines", &self.allowed_disciplines)
            .field("result", &self.result)
            .field(
                "rule_trees",
                &format!("<{} trees loaded>", self.rule_trees.len()),
            )
            .finish()
    }
}

impl Default for EligibilityWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl EligibilityWorld {
    /// Create a new world with all bundled rule trees loaded.
    pub fn new() -> Self {
        let rule_trees = match load_all_rule_trees() {
            Ok(trees) => trees,
            Err(e) => panic!("Failed to load rule trees: {}", e),
        };

        Self {
            rule_trees,
            tree: None,
            evaluation_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
            project: Project::new(0.0),
            engineers: Vec::new(),
            allowed_disciplines: Vec::new(),
            catalog: None,
            result: None,
        }
    }

    /// Evaluate the current tree and store the result. Traces are always on
    /// so Then steps can inspect per-node counts.
    pub fn evaluate(&mut self, mode: EvaluationMode) {
        let tree = self.tree.as_ref().expect("no rule tree selected");

        let mut evaluator = EligibilityEvaluator::new(self.evaluation_date).with_trace(true);
        if let Some(catalog) = &self.catalog {
            evaluator = evaluator.with_level_catalog(catalog);
        }

        let result = evaluator.evaluate_with_disciplines(
            &self.project,
            tree,
            &self.engineers,
            mode,
            &self.allowed_disciplines,
        );
        self.result = Some(result);
    }

    pub fn result(&self) -> &EligibilityResult {
        self.result
            .as_ref()
            .expect("no evaluation has been run in this scenario")
    }
}
