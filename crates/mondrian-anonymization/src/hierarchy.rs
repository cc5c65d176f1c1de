//! Generalization hierarchies for categorical quasi-identifiers.
//!
//! A hierarchy is stored as an arena of nodes addressed by [`NodeId`]. The
//! root is always node 0 and node ids follow a pre-order walk of the
//! definition, so children always have larger ids than their parent.

use crate::error::{AnonymizationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Nested `(label, children)` description of a hierarchy, as found in
/// configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyDefinition {
    pub label: String,
    #[serde(default)]
    pub children: Vec<HierarchyDefinition>,
}

impl HierarchyDefinition {
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: vec![],
        }
    }

    pub fn node(label: impl Into<String>, children: Vec<HierarchyDefinition>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    /// Shorthand for a node whose children are all leaves.
    pub fn with_leaves<I, S>(label: impl Into<String>, leaves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::node(label, leaves.into_iter().map(Self::leaf).collect())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node {
    label: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
    height: usize,
}

#[derive(Debug)]
pub struct Hierarchy {
    name: String,
    nodes: Vec<Node>,
    leaves: HashMap<String, NodeId>,
}

impl Hierarchy {
    pub fn new(name: impl Into<String>, definition: &HierarchyDefinition) -> Result<Self> {
        let mut hierarchy = Hierarchy {
            name: name.into(),
            nodes: vec![],
            leaves: HashMap::new(),
        };

        hierarchy.insert(definition, None, 0)?;

        // Pre-order ids: every child comes after its parent.
        for index in (1..hierarchy.nodes.len()).rev() {
            let height = hierarchy.nodes[index].height;
            if let Some(NodeId(parent)) = hierarchy.nodes[index].parent {
                let parent = &mut hierarchy.nodes[parent];
                parent.height = parent.height.max(height + 1);
            }
        }

        Ok(hierarchy)
    }

    fn insert(
        &mut self,
        definition: &HierarchyDefinition,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Result<NodeId> {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            label: definition.label.clone(),
            parent,
            children: vec![],
            depth,
            height: 0,
        });

        if definition.children.is_empty() {
            if self.leaves.insert(definition.label.clone(), id).is_some() {
                return Err(AnonymizationError::InvalidConfiguration(format!(
                    "hierarchy {} contains the leaf {:?} more than once",
                    self.name, definition.label
                )));
            }
            return Ok(id);
        }

        for child in &definition.children {
            let child_id = self.insert(child, Some(id), depth + 1)?;
            self.nodes[id.0].children.push(child_id);
        }

        Ok(id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn label(&self, node: NodeId) -> &str {
        &self.nodes[node.0].label
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.nodes[node.0].children.is_empty()
    }

    /// Distance from the root; the root has depth 0.
    pub fn depth(&self, node: NodeId) -> usize {
        self.nodes[node.0].depth
    }

    /// Length of the longest path from `node` down to one of its leaves.
    pub fn height(&self, node: NodeId) -> usize {
        self.nodes[node.0].height
    }

    pub fn leaf(&self, value: &str) -> Option<NodeId> {
        self.leaves.get(value).copied()
    }

    /// Like [`Hierarchy::leaf`], but an unknown value is an error.
    pub fn resolve(&self, value: &str) -> Result<NodeId> {
        self.leaf(value)
            .ok_or_else(|| AnonymizationError::UnknownValue {
                hierarchy: self.name.clone(),
                value: value.to_string(),
            })
    }

    /// Node ids from `node` up to and including the root.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), move |current| self.parent(*current))
    }

    /// Labels from the leaf holding `value` up to the root.
    pub fn ancestor_path(&self, value: &str) -> Result<Vec<&str>> {
        let leaf = self.resolve(value)?;
        Ok(self.ancestors(leaf).map(|node| self.label(node)).collect())
    }

    /// Label of the ancestor `level` steps above the leaf holding `value`.
    /// Levels past the root stay at the root.
    pub fn generalize_to_level(&self, value: &str, level: usize) -> Result<&str> {
        let leaf = self.resolve(value)?;
        let node = self
            .ancestors(leaf)
            .take(level + 1)
            .last()
            .unwrap_or(leaf);
        Ok(self.label(node))
    }

    fn pairwise_common_ancestor(&self, mut a: NodeId, mut b: NodeId) -> NodeId {
        while self.depth(a) > self.depth(b) {
            a = self.parent(a).unwrap_or(a);
        }
        while self.depth(b) > self.depth(a) {
            b = self.parent(b).unwrap_or(b);
        }
        while a != b {
            match (self.parent(a), self.parent(b)) {
                (Some(pa), Some(pb)) => {
                    a = pa;
                    b = pb;
                }
                _ => return self.root(),
            }
        }
        a
    }

    /// Most specific node that is an ancestor of (or equal to) every node
    /// in `nodes`. `None` when `nodes` is empty.
    pub fn lowest_common_ancestor<I>(&self, nodes: I) -> Option<NodeId>
    where
        I: IntoIterator<Item = NodeId>,
    {
        nodes
            .into_iter()
            .reduce(|acc, node| self.pairwise_common_ancestor(acc, node))
    }

    /// Label of the lowest common ancestor of all `values`. An empty set
    /// generalizes to the root.
    pub fn common_generalization<'a, I>(&self, values: I) -> Result<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let leaves = values
            .into_iter()
            .map(|value| self.resolve(value))
            .collect::<Result<Vec<NodeId>>>()?;

        let node = self
            .lowest_common_ancestor(leaves)
            .unwrap_or_else(|| self.root());

        Ok(self.label(node))
    }

    /// All leaves below `node`, in declaration order. A leaf is its own
    /// only leaf.
    pub fn leaves(&self, node: NodeId) -> Vec<NodeId> {
        let mut leaves = vec![];
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let children = self.children(current);
            if children.is_empty() {
                leaves.push(current);
            } else {
                stack.extend(children.iter().rev());
            }
        }
        leaves
    }

    /// One set of leaves per immediate child of `node`, in child order.
    pub fn child_groups(&self, node: NodeId) -> Vec<HashSet<NodeId>> {
        self.children(node)
            .iter()
            .map(|child| self.leaves(*child).into_iter().collect())
            .collect()
    }
}
