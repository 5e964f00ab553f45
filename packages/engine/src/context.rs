//! Per-call evaluation context
//!
//! Bundles everything that stays fixed while one rule tree is walked: the
//! project snapshot, the evaluation mode and date, the discipline allow-list
//! and the optional level catalog. It also carries the trace builder and any
//! structural issues met during the walk. A context lives for exactly one
//! evaluation call and is never shared.

use crate::error::StructuralIssue;
use crate::levels::{accepted_levels, LevelCatalog};
use crate::roster::Project;
use crate::trace::TraceBuilder;
use crate::tree::RuleNode;
use crate::types::{EvaluationMode, LevelSelection};
use chrono::NaiveDate;
use std::collections::HashSet;

/// State of a single evaluation call.
pub struct EvaluationContext<'a> {
    project: &'a Project,
    mode: EvaluationMode,
    evaluation_date: NaiveDate,
    allowed_disciplines: HashSet<&'a str>,
    catalog: Option<&'a LevelCatalog>,
    issues: Vec<StructuralIssue>,
    pub(crate) trace: TraceBuilder,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context.
    ///
    /// An empty `allowed_disciplines` slice means every discipline is evaluated.
    pub fn new(
        project: &'a Project,
        mode: EvaluationMode,
        evaluation_date: NaiveDate,
        allowed_disciplines: &'a [String],
    ) -> Self {
        Self {
            project,
            mode,
            evaluation_date,
            allowed_disciplines: allowed_disciplines.iter().map(String::as_str).collect(),
            catalog: None,
            issues: Vec::new(),
            trace: TraceBuilder::disabled(),
        }
    }

    pub fn with_catalog(mut self, catalog: Option<&'a LevelCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = if enabled {
            TraceBuilder::new()
        } else {
            TraceBuilder::disabled()
        };
        self
    }

    pub fn project(&self) -> &Project {
        self.project
    }

    pub fn mode(&self) -> EvaluationMode {
        self.mode
    }

    pub fn evaluation_date(&self) -> NaiveDate {
        self.evaluation_date
    }

    /// Whether `child` of a block takes part in the evaluation.
    ///
    /// Only engineer items are filtered; blocks are always visible.
    pub fn is_visible(&self, child: &RuleNode) -> bool {
        match child {
            RuleNode::EngineerItem(item) => {
                self.allowed_disciplines.is_empty()
                    || self.allowed_disciplines.contains(item.id.as_str())
            }
            RuleNode::Block(_) => true,
        }
    }

    /// Level values that satisfy `selection`, cut from the catalog when one
    /// is configured.
    pub fn accepted_levels(&self, selection: &LevelSelection) -> HashSet<String> {
        match self.catalog {
            Some(catalog) => catalog.accepted(&selection.selected),
            None => accepted_levels(&selection.options, &selection.selected),
        }
    }

    /// Record a structural issue found during the walk.
    pub fn report(&mut self, issue: StructuralIssue) {
        tracing::warn!(issue = %issue, "Structural issue during evaluation");
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[StructuralIssue] {
        &self.issues
    }

    pub(crate) fn take_issues(&mut self) -> Vec<StructuralIssue> {
        std::mem::take(&mut self.issues)
    }
}
