//! Engineer eligibility evaluator
//!
//! Walks a rule tree top-down and decides whether a pool of engineers can
//! staff a project, and which engineer fills which requirement.
//!
//! - **Blocks** compose their children. `and` threads a shrinking pool through
//!   its children in declaration order, so an engineer taken by one child is
//!   unavailable to the next; `or` offers the same pool to each alternative
//!   and keeps the first that passes.
//! - **Engineer items** compute a quota from the project area, collect every
//!   engineer with an active license of the item's discipline at an accepted
//!   level, and compare the count with the quota under the evaluation mode.
//!
//! # Example
//!
//! ```ignore
//! use eligibility_engine::{EligibilityEvaluator, EvaluationMode, Project, RuleNode};
//!
//! let tree = RuleNode::from_yaml_file("rules/residential.yaml")?;
//! let evaluator = EligibilityEvaluator::new(today);
//! let result = evaluator.evaluate(
//!     &Project::new(250.0),
//!     &tree,
//!     &engineers,
//!     EvaluationMode::CheckEngineers,
//! );
//! println!("passed: {}", result.passed);
//! ```

use crate::config;
use crate::context::EvaluationContext;
use crate::error::{EngineError, Result, StructuralIssue};
use crate::levels::LevelCatalog;
use crate::roster::{Engineer, Project};
use crate::trace::PathNode;
use crate::tree::{BlockNode, EngineerItemNode, RuleNode};
use crate::types::{Condition, EvaluationMode, PathNodeType};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// Result of an eligibility evaluation
#[derive(Debug, Clone, Serialize)]
pub struct EligibilityResult {
    /// Whether the rule tree is satisfied
    pub passed: bool,
    /// Engineers attributed to requirements, in tree order
    pub selected_engineers: Vec<Engineer>,
    /// Pool engineers no requirement accounted for (check mode only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unassigned: Vec<String>,
    /// Structural defects that made the evaluation inconclusive
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<StructuralIssue>,
    /// Why the evaluator refused to run, e.g. an oversized pool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<String>,
    /// Evaluation trace, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<PathNode>,
}

impl EligibilityResult {
    fn failed() -> Self {
        Self {
            passed: false,
            selected_engineers: Vec::new(),
            unassigned: Vec::new(),
            issues: Vec::new(),
            rejected: None,
            trace: None,
        }
    }

    /// Failed result for an evaluation that never ran.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            rejected: Some(reason.into()),
            ..Self::failed()
        }
    }

    /// Failed result carrying the structural issues of a malformed tree.
    pub fn malformed(issues: Vec<StructuralIssue>) -> Self {
        Self {
            issues,
            ..Self::failed()
        }
    }

    /// True when the failure stems from a broken rule tree rather than from
    /// the engineers on offer.
    pub fn is_malformed(&self) -> bool {
        !self.issues.is_empty()
    }

    /// True when the inputs were refused before evaluation started.
    pub fn is_rejected(&self) -> bool {
        self.rejected.is_some()
    }

    /// True when the verdict is not a statement about the engineers: the tree
    /// is malformed or the inputs were refused.
    pub fn is_inconclusive(&self) -> bool {
        self.is_malformed() || self.is_rejected()
    }

    /// Ids of the selected engineers, in selection order.
    pub fn selected_ids(&self) -> Vec<&str> {
        self.selected_engineers
            .iter()
            .map(|engineer| engineer.id.as_str())
            .collect()
    }
}

/// Verdict of one subtree, borrowing from the caller's pool.
struct NodeOutcome<'p> {
    passed: bool,
    selected: Vec<&'p Engineer>,
}

impl<'p> NodeOutcome<'p> {
    fn fail() -> Self {
        Self {
            passed: false,
            selected: Vec::new(),
        }
    }
}

/// Stateless evaluator of engineer eligibility rule trees.
///
/// Holds only immutable configuration; every call builds its own
/// [`EvaluationContext`], so one evaluator may serve concurrent callers.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityEvaluator<'a> {
    evaluation_date: NaiveDate,
    catalog: Option<&'a LevelCatalog>,
    trace: bool,
}

impl<'a> EligibilityEvaluator<'a> {
    /// Create an evaluator judging license activity as of `evaluation_date`.
    pub fn new(evaluation_date: NaiveDate) -> Self {
        Self {
            evaluation_date,
            catalog: None,
            trace: false,
        }
    }

    /// Rank license levels by a global catalog instead of each node's options.
    pub fn with_level_catalog(mut self, catalog: &'a LevelCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Record an evaluation trace in every result.
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    /// Evaluate `root` for every discipline.
    pub fn evaluate(
        &self,
        project: &Project,
        root: &RuleNode,
        engineers: &[Engineer],
        mode: EvaluationMode,
    ) -> EligibilityResult {
        self.evaluate_with_disciplines(project, root, engineers, mode, &[])
    }

    /// Evaluate `root`, skipping engineer items whose discipline is not in
    /// `allowed_disciplines` (an empty list allows all).
    ///
    /// Never fails: structural problems come back as a failed result with
    /// `issues` filled in, see [`EligibilityResult::is_malformed`]. Refused
    /// inputs set `rejected`, see [`EligibilityResult::is_rejected`].
    pub fn evaluate_with_disciplines(
        &self,
        project: &Project,
        root: &RuleNode,
        engineers: &[Engineer],
        mode: EvaluationMode,
        allowed_disciplines: &[String],
    ) -> EligibilityResult {
        match self.try_evaluate(project, root, engineers, mode, allowed_disciplines) {
            Ok(result) => result,
            Err(EngineError::Malformed(issues)) => EligibilityResult::malformed(issues),
            Err(err) => {
                tracing::warn!(error = %err, "Evaluation rejected");
                EligibilityResult::rejected(err.to_string())
            }
        }
    }

    /// Evaluate `root`, surfacing a malformed tree as
    /// `Err(EngineError::Malformed)`.
    ///
    /// # Returns
    /// * `Ok(EligibilityResult)` - The verdict; `passed = false` is an ordinary outcome
    /// * `Err(EngineError::Malformed)` - The rule tree is not well-formed
    /// * `Err(EngineError::LimitExceeded)` - The pool exceeds [`config::MAX_POOL_SIZE`]
    pub fn try_evaluate(
        &self,
        project: &Project,
        root: &RuleNode,
        engineers: &[Engineer],
        mode: EvaluationMode,
        allowed_disciplines: &[String],
    ) -> Result<EligibilityResult> {
        if engineers.len() > config::MAX_POOL_SIZE {
            return Err(EngineError::LimitExceeded {
                what: "engineer pool".to_string(),
                actual: engineers.len(),
                max: config::MAX_POOL_SIZE,
            });
        }

        let issues = root.validate(self.catalog);
        if !issues.is_empty() {
            tracing::warn!(
                root = %root.id(),
                issues = issues.len(),
                "Refusing to evaluate malformed rule tree"
            );
            return Err(EngineError::Malformed(issues));
        }

        let mut ctx = EvaluationContext::new(project, mode, self.evaluation_date, allowed_disciplines)
            .with_catalog(self.catalog)
            .with_trace(self.trace);

        ctx.trace.push("evaluation", PathNodeType::Evaluation);
        ctx.trace.set_detail(mode_label(mode));

        let pool: Vec<&Engineer> = engineers.iter().collect();
        let outcome = evaluate_node(root, &pool, &mut ctx);

        let issues = ctx.take_issues();
        if !issues.is_empty() {
            return Err(EngineError::Malformed(issues));
        }

        let mut passed = outcome.passed;
        let mut unassigned = Vec::new();

        if mode == EvaluationMode::CheckEngineers {
            let selected_ids: HashSet<&str> =
                outcome.selected.iter().map(|e| e.id.as_str()).collect();
            unassigned = engineers
                .iter()
                .filter(|e| !selected_ids.contains(e.id.as_str()))
                .map(|e| e.id.clone())
                .collect();

            if outcome.selected.len() != engineers.len() {
                tracing::debug!(
                    pool = engineers.len(),
                    selected = outcome.selected.len(),
                    "Pool not fully accounted for"
                );
                passed = false;
            }
            ctx.trace.set_detail(format!(
                "{}: {} of {} engineers assigned",
                mode_label(mode),
                outcome.selected.len(),
                engineers.len()
            ));
        }

        ctx.trace.set_verdict(passed);
        let trace = ctx.trace.build();

        tracing::debug!(
            root = %root.id(),
            mode = mode_label(mode),
            passed,
            selected = outcome.selected.len(),
            "Eligibility evaluated"
        );

        Ok(EligibilityResult {
            passed,
            selected_engineers: outcome.selected.into_iter().cloned().collect(),
            unassigned,
            issues: Vec::new(),
            rejected: None,
            trace,
        })
    }
}

/// Evaluate one node against `pool`.
fn evaluate_node<'p>(
    node: &RuleNode,
    pool: &[&'p Engineer],
    ctx: &mut EvaluationContext<'_>,
) -> NodeOutcome<'p> {
    match node {
        RuleNode::Block(block) => {
            ctx.trace.push(&block.id, PathNodeType::Block);
            let outcome = evaluate_block(block, pool, ctx);
            finish(&block.id, &outcome, ctx);
            outcome
        }
        RuleNode::EngineerItem(item) => {
            ctx.trace.push(&item.id, PathNodeType::EngineerItem);
            let outcome = evaluate_engineer_item(item, pool, ctx);
            finish(&item.id, &outcome, ctx);
            outcome
        }
    }
}

fn finish(id: &str, outcome: &NodeOutcome<'_>, ctx: &mut EvaluationContext<'_>) {
    tracing::debug!(
        node = %id,
        passed = outcome.passed,
        selected = outcome.selected.len(),
        "Node evaluated"
    );
    if ctx.trace.is_enabled() {
        ctx.trace.set_verdict(outcome.passed);
        ctx.trace
            .set_selected(outcome.selected.iter().map(|e| e.id.clone()).collect());
        ctx.trace.pop();
    }
}

fn evaluate_block<'p>(
    block: &BlockNode,
    pool: &[&'p Engineer],
    ctx: &mut EvaluationContext<'_>,
) -> NodeOutcome<'p> {
    let condition = match block.condition() {
        Ok(condition) => condition,
        Err(kind) => {
            ctx.report(StructuralIssue::new(&block.id, kind));
            return NodeOutcome::fail();
        }
    };
    ctx.trace.set_detail(condition.as_str());

    let visible: Vec<&RuleNode> = block
        .children
        .iter()
        .filter(|child| ctx.is_visible(child))
        .collect();

    match condition {
        Condition::And => evaluate_all(&visible, pool, ctx),
        Condition::Or => evaluate_any(&visible, pool, ctx),
    }
}

/// All children must pass; each sees the pool minus earlier selections.
fn evaluate_all<'p>(
    children: &[&RuleNode],
    pool: &[&'p Engineer],
    ctx: &mut EvaluationContext<'_>,
) -> NodeOutcome<'p> {
    let mut remaining: Vec<&'p Engineer> = pool.to_vec();
    let mut selected: Vec<&'p Engineer> = Vec::new();

    for child in children {
        let outcome = evaluate_node(child, &remaining, ctx);
        if !outcome.passed {
            return NodeOutcome::fail();
        }

        let taken: HashSet<&str> = outcome.selected.iter().map(|e| e.id.as_str()).collect();
        remaining.retain(|engineer| !taken.contains(engineer.id.as_str()));
        selected.extend(outcome.selected);
    }

    NodeOutcome {
        passed: true,
        selected,
    }
}

/// First child to pass wins; every child sees the full pool.
fn evaluate_any<'p>(
    children: &[&RuleNode],
    pool: &[&'p Engineer],
    ctx: &mut EvaluationContext<'_>,
) -> NodeOutcome<'p> {
    for child in children {
        let outcome = evaluate_node(child, pool, ctx);
        if outcome.passed {
            return outcome;
        }
    }
    NodeOutcome::fail()
}

fn evaluate_engineer_item<'p>(
    item: &EngineerItemNode,
    pool: &[&'p Engineer],
    ctx: &mut EvaluationContext<'_>,
) -> NodeOutcome<'p> {
    let meterage = match item.meterage() {
        Ok(meterage) => meterage,
        Err(kind) => {
            ctx.report(StructuralIssue::new(&item.id, kind));
            return NodeOutcome::fail();
        }
    };
    let selection = match item.license_level() {
        Ok(selection) => selection,
        Err(kind) => {
            ctx.report(StructuralIssue::new(&item.id, kind));
            return NodeOutcome::fail();
        }
    };

    let required = ctx.project().required_count(meterage);
    let accepted = ctx.accepted_levels(selection);
    let on = ctx.evaluation_date();

    let matched: Vec<&'p Engineer> = pool
        .iter()
        .copied()
        .filter(|engineer| engineer.qualifies_for(&item.id, &accepted, on))
        .collect();

    let passed = ctx.mode().accepts(matched.len(), required);
    ctx.trace.set_counts(required, matched.len());

    NodeOutcome {
        passed,
        selected: matched,
    }
}

fn mode_label(mode: EvaluationMode) -> &'static str {
    match mode {
        EvaluationMode::ModifyEngineers => "MODIFY_ENGINEERS",
        EvaluationMode::CheckEngineers => "CHECK_ENGINEERS",
    }
}
