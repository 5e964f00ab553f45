//! Evaluation tracing for audit trails and debugging
//!
//! Records how a verdict was reached: which nodes were visited, which quota
//! each engineer item computed, how many engineers matched, and which ones
//! were selected. Useful for:
//!
//! - **Audit trails**: documenting why a staffing list was accepted or rejected
//! - **Debugging**: locating the requirement that blocked a project
//! - **Operator feedback**: showing the shortfall per discipline
//!
//! # Example
//!
//! ```ignore
//! use eligibility_engine::trace::TraceBuilder;
//! use eligibility_engine::PathNodeType;
//!
//! let mut builder = TraceBuilder::new();
//! builder.push("root", PathNodeType::Block);
//!
//! builder.push("civil", PathNodeType::EngineerItem);
//! builder.set_counts(3, 2);
//! builder.set_verdict(false);
//! builder.pop();
//!
//! builder.set_verdict(false);
//! let trace = builder.build();
//! ```

use crate::types::PathNodeType;
use serde::Serialize;
use std::time::Instant;

/// A node in the evaluation trace tree.
///
/// Mirrors one visited rule node. Children appear in visiting order, so an
/// OR block shows the alternatives it tried up to the first that passed.
#[derive(Debug, Clone, Serialize)]
pub struct PathNode {
    /// Kind of rule node visited
    pub node_type: PathNodeType,

    /// Rule node id (discipline code for engineer items)
    pub name: String,

    /// Free-form qualifier, e.g. the block operator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Verdict of this node, if one was reached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,

    /// Quota computed by an engineer item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<usize>,

    /// Number of engineers matching an engineer item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<usize>,

    /// Ids of the engineers this node attributed to itself
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selected: Vec<String>,

    /// Child nodes representing nested evaluation steps
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PathNode>,

    /// Evaluation duration in microseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_us: Option<u64>,
}

impl PathNode {
    /// Create a new PathNode with the given type and name.
    pub fn new(node_type: PathNodeType, name: impl Into<String>) -> Self {
        Self {
            node_type,
            name: name.into(),
            detail: None,
            passed: None,
            required: None,
            matched: None,
            selected: Vec::new(),
            children: Vec::new(),
            duration_us: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_verdict(mut self, passed: bool) -> Self {
        self.passed = Some(passed);
        self
    }

    pub fn with_counts(mut self, required: usize, matched: usize) -> Self {
        self.required = Some(required);
        self.matched = Some(matched);
        self
    }

    /// Add a child node.
    pub fn with_child(mut self, child: PathNode) -> Self {
        self.children.push(child);
        self
    }

    /// Find the first node (pre-order) with the given name.
    pub fn find(&self, name: &str) -> Option<&PathNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Render the trace as a human-readable tree string.
    ///
    /// Produces output like:
    /// ```text
    /// root (block) [and] = fail
    /// +-- civil (engineer_item) 3/3 = pass {e1, e2, e3}
    /// `-- services (block) [or] = fail
    ///     +-- electrical (engineer_item) 1/0 = fail
    ///     `-- mechanical (engineer_item) 1/0 = fail
    /// ```
    ///
    /// Counts read `required/matched`.
    ///
    /// # Arguments
    /// * `indent` - Current indentation level (start with 0)
    /// * `is_last` - Whether this is the last child in its parent (affects line prefix)
    pub fn render(&self, indent: usize, is_last: bool) -> String {
        self.render_internal(indent, is_last, true)
    }

    fn render_internal(&self, indent: usize, is_last: bool, is_top_level: bool) -> String {
        let mut lines = Vec::new();

        let prefix = if is_top_level {
            ""
        } else if is_last {
            "`-- "
        } else {
            "+-- "
        };

        let child_indent = if is_top_level {
            ""
        } else if is_last {
            "    "
        } else {
            "|   "
        };

        let mut line = format!("{}{} ({})", prefix, self.name, type_label(self.node_type));

        if let Some(ref detail) = self.detail {
            line.push_str(&format!(" [{}]", detail));
        }

        if let (Some(required), Some(matched)) = (self.required, self.matched) {
            line.push_str(&format!(" {}/{}", required, matched));
        }

        if let Some(passed) = self.passed {
            line.push_str(if passed { " = pass" } else { " = fail" });
        }

        if !self.selected.is_empty() {
            line.push_str(&format!(" {}", format_selection(&self.selected)));
        }

        if let Some(duration) = self.duration_us {
            if duration >= 100 {
                line.push_str(&format!(" ({}us)", duration));
            }
        }

        lines.push(line);

        let child_count = self.children.len();
        let padding = " ".repeat(indent * 4) + child_indent;
        for (i, child) in self.children.iter().enumerate() {
            let is_last_child = i == child_count - 1;
            let child_str = child.render_internal(0, is_last_child, false);
            for child_line in child_str.lines() {
                lines.push(format!("{}{}", padding, child_line));
            }
        }

        lines.join("\n")
    }

    /// Render the trace as a compact single-line summary.
    pub fn render_compact(&self) -> String {
        let type_str = match self.node_type {
            PathNodeType::Evaluation => "eval",
            PathNodeType::Block => "blk",
            PathNodeType::EngineerItem => "eng",
        };

        let verdict = match self.passed {
            Some(true) => "=pass",
            Some(false) => "=fail",
            None => "",
        };

        format!("{}:{}{}", type_str, self.name, verdict)
    }
}

fn type_label(node_type: PathNodeType) -> &'static str {
    match node_type {
        PathNodeType::Evaluation => "evaluation",
        PathNodeType::Block => "block",
        PathNodeType::EngineerItem => "engineer_item",
    }
}

/// Format selected engineer ids compactly for trace output.
fn format_selection(ids: &[String]) -> String {
    if ids.len() <= 5 {
        format!("{{{}}}", ids.join(", "))
    } else {
        format!("{{{} engineers}}", ids.len())
    }
}

/// A node being built, with timing information.
#[derive(Debug)]
struct BuildingNode {
    node: PathNode,
    start_time: Instant,
}

/// Builder for constructing evaluation traces using a stack-based approach.
///
/// The evaluator pushes a node when it enters a rule node and pops it when
/// the node's verdict is known, which reproduces the shape of the visited
/// part of the rule tree.
#[derive(Debug)]
pub struct TraceBuilder {
    /// Stack of nodes being built (last is current)
    stack: Vec<BuildingNode>,

    /// Most recently completed top-level node
    completed: Option<PathNode>,

    /// Whether tracing is enabled
    enabled: bool,
}

impl Default for TraceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceBuilder {
    /// Create a new TraceBuilder with tracing enabled.
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            completed: None,
            enabled: true,
        }
    }

    /// Create a new TraceBuilder with tracing disabled (no-op).
    pub fn disabled() -> Self {
        Self {
            stack: Vec::new(),
            completed: None,
            enabled: false,
        }
    }

    /// Check if tracing is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Push a new node onto the stack when entering a rule node.
    pub fn push(&mut self, name: impl Into<String>, node_type: PathNodeType) {
        if !self.enabled {
            return;
        }

        self.stack.push(BuildingNode {
            node: PathNode::new(node_type, name),
            start_time: Instant::now(),
        });
    }

    /// Set the qualifier of the current node.
    pub fn set_detail(&mut self, detail: impl Into<String>) {
        if let Some(current) = self.current() {
            current.detail = Some(detail.into());
        }
    }

    /// Set the verdict of the current node.
    pub fn set_verdict(&mut self, passed: bool) {
        if let Some(current) = self.current() {
            current.passed = Some(passed);
        }
    }

    /// Set quota and match counts of the current node.
    pub fn set_counts(&mut self, required: usize, matched: usize) {
        if let Some(current) = self.current() {
            current.required = Some(required);
            current.matched = Some(matched);
        }
    }

    /// Set the engineers the current node selected.
    pub fn set_selected(&mut self, ids: Vec<String>) {
        if let Some(current) = self.current() {
            current.selected = ids;
        }
    }

    fn current(&mut self) -> Option<&mut PathNode> {
        if !self.enabled {
            return None;
        }
        self.stack.last_mut().map(|building| &mut building.node)
    }

    /// Pop the current node from the stack, making it a child of the parent.
    ///
    /// Returns the popped node.
    pub fn pop(&mut self) -> Option<PathNode> {
        if !self.enabled {
            return None;
        }

        let building = self.stack.pop()?;
        let duration = building.start_time.elapsed().as_micros() as u64;

        let mut completed = building.node;
        completed.duration_us = Some(duration);

        match self.stack.last_mut() {
            Some(parent) => parent.node.children.push(completed.clone()),
            None => self.completed = Some(completed.clone()),
        }

        Some(completed)
    }

    /// Build the final trace, consuming the builder.
    ///
    /// Pops all remaining nodes and returns the root. Returns None if nothing
    /// was recorded or tracing was disabled.
    pub fn build(mut self) -> Option<PathNode> {
        if !self.enabled {
            return None;
        }

        while !self.stack.is_empty() {
            self.pop();
        }
        self.completed
    }

    /// Get the current depth of the trace stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Check if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
