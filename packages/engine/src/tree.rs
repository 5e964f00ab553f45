//! Rule tree model and loader
//!
//! A rule tree ("condition blocks") is a hierarchy of [`RuleNode`]s. Blocks
//! compose their children with an `and`/`or` operator; engineer items are the
//! leaves and state a staffing requirement for one discipline.
//!
//! Trees are stored as YAML or JSON, internally tagged by `type`:
//!
//! ```yaml
//! id: structure
//! title: Structural staffing
//! type: block
//! properties:
//!   - name: condition
//!     value: and
//! children:
//!   - id: civil
//!     title: Civil engineer
//!     type: engineer_item
//!     properties:
//!       - name: refTotalMeterage
//!         value: 100
//!       - name: refLicenseLevel
//!         value:
//!           selected: grade-2
//!           options:
//!             - { value: grade-1, order: 1 }
//!             - { value: grade-2, order: 2 }
//! ```
//!
//! Loading only checks that the document parses. Whether the tree is fit for
//! evaluation is answered by [`RuleNode::validate`], which collects every
//! structural issue instead of stopping at the first.

use crate::config;
use crate::error::{EngineError, Result, StructuralIssue, StructuralIssueKind};
use crate::levels::LevelCatalog;
use crate::types::{Condition, LevelSelection, PropertyValue};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Named, typed property of a rule node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Composition node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Id of the enclosing block; informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub children: Vec<RuleNode>,
}

impl BlockNode {
    /// Create a block with the given operator and no children.
    pub fn new(id: impl Into<String>, condition: Condition) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            parent: None,
            properties: vec![Property::new(
                config::CONDITION_PROPERTY,
                condition.as_str(),
            )],
            children: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_child(mut self, child: impl Into<RuleNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// The composition operator.
    pub fn condition(&self) -> std::result::Result<Condition, StructuralIssueKind> {
        let value = find_property(&self.properties, config::CONDITION_PROPERTY)
            .ok_or(StructuralIssueKind::MissingCondition)?;
        let text = value
            .as_str()
            .ok_or_else(|| wrong_type(config::CONDITION_PROPERTY, "string"))?;
        Condition::parse(text).ok_or_else(|| StructuralIssueKind::UnknownCondition {
            value: text.to_string(),
        })
    }
}

/// Terminal staffing requirement for one discipline
///
/// The node id doubles as the discipline code matched against license types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineerItemNode {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl EngineerItemNode {
    pub fn new(id: impl Into<String>, meterage: f64, level: LevelSelection) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            parent: None,
            properties: vec![
                Property::new(config::METERAGE_PROPERTY, meterage),
                Property::new(config::LICENSE_LEVEL_PROPERTY, level),
            ],
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Area in square meters one engineer of this discipline covers.
    pub fn meterage(&self) -> std::result::Result<f64, StructuralIssueKind> {
        let value = find_property(&self.properties, config::METERAGE_PROPERTY)
            .ok_or(StructuralIssueKind::MissingMeterage)?;
        let meterage = value
            .as_number()
            .ok_or_else(|| wrong_type(config::METERAGE_PROPERTY, "number"))?;
        if meterage.is_finite() && meterage > 0.0 {
            Ok(meterage)
        } else {
            Err(StructuralIssueKind::InvalidMeterage { value: meterage })
        }
    }

    /// The pinned license level and the option list it is ranked in.
    pub fn license_level(&self) -> std::result::Result<&LevelSelection, StructuralIssueKind> {
        let value = find_property(&self.properties, config::LICENSE_LEVEL_PROPERTY)
            .ok_or(StructuralIssueKind::MissingLicenseLevel)?;
        let selection = value
            .as_level()
            .ok_or_else(|| wrong_type(config::LICENSE_LEVEL_PROPERTY, "level selection"))?;
        if selection.options.is_empty() {
            return Err(StructuralIssueKind::EmptyLevelOptions);
        }
        Ok(selection)
    }
}

/// One node of a rule tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleNode {
    Block(BlockNode),
    EngineerItem(EngineerItemNode),
}

impl From<BlockNode> for RuleNode {
    fn from(block: BlockNode) -> Self {
        RuleNode::Block(block)
    }
}

impl From<EngineerItemNode> for RuleNode {
    fn from(item: EngineerItemNode) -> Self {
        RuleNode::EngineerItem(item)
    }
}

impl RuleNode {
    /// AND block over `children`.
    pub fn all(id: impl Into<String>, children: Vec<RuleNode>) -> Self {
        let mut block = BlockNode::new(id, Condition::And);
        block.children = children;
        RuleNode::Block(block)
    }

    /// OR block over `children`.
    pub fn any(id: impl Into<String>, children: Vec<RuleNode>) -> Self {
        let mut block = BlockNode::new(id, Condition::Or);
        block.children = children;
        RuleNode::Block(block)
    }

    /// Engineer item requiring one engineer per `meterage` square meters.
    pub fn engineers(id: impl Into<String>, meterage: f64, level: LevelSelection) -> Self {
        RuleNode::EngineerItem(EngineerItemNode::new(id, meterage, level))
    }

    pub fn id(&self) -> &str {
        match self {
            RuleNode::Block(block) => &block.id,
            RuleNode::EngineerItem(item) => &item.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            RuleNode::Block(block) => &block.title,
            RuleNode::EngineerItem(item) => &item.title,
        }
    }

    /// Stored parent back-reference. Never used for evaluation; see
    /// [`RuleNode::parent_of`] for the structural parent.
    pub fn parent(&self) -> Option<&str> {
        match self {
            RuleNode::Block(block) => block.parent.as_deref(),
            RuleNode::EngineerItem(item) => item.parent.as_deref(),
        }
    }

    pub fn properties(&self) -> &[Property] {
        match self {
            RuleNode::Block(block) => &block.properties,
            RuleNode::EngineerItem(item) => &item.properties,
        }
    }

    /// First property named `name`.
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        find_property(self.properties(), name)
    }

    /// Child nodes; always empty for engineer items.
    pub fn children(&self) -> &[RuleNode] {
        match self {
            RuleNode::Block(block) => &block.children,
            RuleNode::EngineerItem(_) => &[],
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, RuleNode::Block(_))
    }

    /// Depth-first, pre-order traversal starting at this node.
    pub fn walk(&self) -> impl Iterator<Item = &RuleNode> {
        self.walk_entries().map(|entry| entry.node)
    }

    /// Pre-order traversal yielding each node with its structural parent and depth.
    pub fn walk_entries(&self) -> Walk<'_> {
        Walk {
            stack: vec![WalkEntry {
                node: self,
                parent: None,
                depth: 1,
            }],
        }
    }

    /// First node in pre-order with the given id.
    pub fn find(&self, id: &str) -> Option<&RuleNode> {
        self.walk().find(|node| node.id() == id)
    }

    /// Structural parent of the first node with the given id.
    pub fn parent_of(&self, id: &str) -> Option<&RuleNode> {
        self.walk_entries()
            .find(|entry| entry.node.id() == id)
            .and_then(|entry| entry.parent)
    }

    /// Discipline codes of all engineer items, in pre-order, without repeats.
    pub fn disciplines(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for node in self.walk() {
            if let RuleNode::EngineerItem(item) = node {
                if !seen.contains(&item.id.as_str()) {
                    seen.push(item.id.as_str());
                }
            }
        }
        seen
    }

    /// Number of levels; a lone node has depth 1.
    pub fn depth(&self) -> usize {
        self.walk_entries()
            .map(|entry| entry.depth)
            .max()
            .unwrap_or(1)
    }

    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Collect every structural issue in the tree.
    ///
    /// Every node is checked, including those an allow-list or an OR
    /// short-circuit would skip during evaluation. When a `catalog` is given,
    /// each pinned level must also appear in it.
    pub fn validate(&self, catalog: Option<&LevelCatalog>) -> Vec<StructuralIssue> {
        let mut issues = Vec::new();
        let mut reported_depth = false;

        for entry in self.walk_entries() {
            let node = entry.node;

            if entry.depth > config::MAX_TREE_DEPTH && !reported_depth {
                issues.push(StructuralIssue::new(
                    node.id(),
                    StructuralIssueKind::TooDeep { depth: entry.depth },
                ));
                reported_depth = true;
            }

            if let (Some(stored), Some(actual)) = (node.parent(), entry.parent) {
                if stored != actual.id() {
                    tracing::warn!(
                        node = %node.id(),
                        stored = %stored,
                        actual = %actual.id(),
                        "Parent back-reference disagrees with tree structure"
                    );
                }
            }

            match node {
                RuleNode::Block(block) => {
                    if let Err(kind) = block.condition() {
                        issues.push(StructuralIssue::new(&block.id, kind));
                    }
                    if block.children.len() > config::MAX_CHILDREN {
                        issues.push(StructuralIssue::new(
                            &block.id,
                            StructuralIssueKind::TooManyChildren {
                                count: block.children.len(),
                            },
                        ));
                    }
                }
                RuleNode::EngineerItem(item) => {
                    if let Err(kind) = item.meterage() {
                        issues.push(StructuralIssue::new(&item.id, kind));
                    }
                    match item.license_level() {
                        Ok(selection) => {
                            let known = selection
                                .options
                                .iter()
                                .any(|option| option.value == selection.selected)
                                && catalog.map_or(true, |c| c.contains(&selection.selected));
                            if !known {
                                issues.push(StructuralIssue::new(
                                    &item.id,
                                    StructuralIssueKind::UnknownLevel {
                                        value: selection.selected.clone(),
                                    },
                                ));
                            }
                        }
                        Err(kind) => issues.push(StructuralIssue::new(&item.id, kind)),
                    }
                }
            }
        }

        issues
    }

    /// Parse a rule tree from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::IoError` if the file cannot be read,
    /// `EngineError::LoadError` if it exceeds [`config::MAX_DOCUMENT_SIZE`],
    /// and a parse error if it is not a tree.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        tracing::debug!(path = %path_ref.display(), "Loading rule tree from YAML file");

        let metadata = fs::metadata(path_ref)?;

        let file_size = metadata.len() as usize;
        if file_size > config::MAX_DOCUMENT_SIZE {
            tracing::warn!(
                size = file_size,
                max = config::MAX_DOCUMENT_SIZE,
                "Rule tree file exceeds size limit"
            );
            return Err(EngineError::LoadError(format!(
                "File exceeds maximum size limit ({} bytes)",
                config::MAX_DOCUMENT_SIZE
            )));
        }

        let content = fs::read_to_string(path_ref)?;

        Self::from_yaml_str(&content)
    }

    /// Parse a rule tree from a YAML string.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        check_document_size(content)?;
        let tree: Self = serde_yaml_ng::from_str(content)?;
        tracing::debug!(
            root = %tree.id(),
            nodes = tree.node_count(),
            "Parsed rule tree successfully"
        );
        Ok(tree)
    }

    /// Parse a rule tree from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self> {
        check_document_size(content)?;
        let tree: Self = serde_json::from_str(content)?;
        tracing::debug!(
            root = %tree.id(),
            nodes = tree.node_count(),
            "Parsed rule tree successfully"
        );
        Ok(tree)
    }

    /// Convert an already parsed JSON document into a rule tree.
    ///
    /// The document is measured in its compact serialized form and held to
    /// the same [`config::MAX_DOCUMENT_SIZE`] limit as [`Self::from_json_str`].
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        check_document_size(&value.to_string())?;
        let tree: Self = serde_json::from_value(value)?;
        tracing::debug!(
            root = %tree.id(),
            nodes = tree.node_count(),
            "Converted rule tree successfully"
        );
        Ok(tree)
    }
}

/// Entry produced by [`RuleNode::walk_entries`]
#[derive(Debug, Clone, Copy)]
pub struct WalkEntry<'a> {
    pub node: &'a RuleNode,
    pub parent: Option<&'a RuleNode>,
    /// 1 for the starting node
    pub depth: usize,
}

/// Pre-order iterator over a rule tree
#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<WalkEntry<'a>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = WalkEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.stack.pop()?;
        // Reverse so the first child is visited first
        for child in entry.node.children().iter().rev() {
            self.stack.push(WalkEntry {
                node: child,
                parent: Some(entry.node),
                depth: entry.depth + 1,
            });
        }
        Some(entry)
    }
}

fn find_property<'a>(properties: &'a [Property], name: &str) -> Option<&'a PropertyValue> {
    properties
        .iter()
        .find(|property| property.name == name)
        .map(|property| &property.value)
}

fn wrong_type(property: &str, expected: &str) -> StructuralIssueKind {
    StructuralIssueKind::WrongPropertyType {
        property: property.to_string(),
        expected: expected.to_string(),
    }
}

fn check_document_size(content: &str) -> Result<()> {
    if content.len() > config::MAX_DOCUMENT_SIZE {
        tracing::warn!(
            size = content.len(),
            max = config::MAX_DOCUMENT_SIZE,
            "Rule tree document exceeds size limit"
        );
        return Err(EngineError::LoadError(format!(
            "Rule tree exceeds maximum size limit ({} bytes)",
            config::MAX_DOCUMENT_SIZE
        )));
    }
    Ok(())
}
