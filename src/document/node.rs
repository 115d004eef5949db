//! Tree nodes and detached subtrees.
//!
//! Attached nodes live in the tree's arena and refer to each other through
//! `NodeId`s. A node that leaves the tree (cut, delete, copy) becomes part of
//! a `Subtree`: a flat, parent-detached, pre-order list of nodes whose parent
//! links are offsets into the list. Subtrees own no arena slots, so they can
//! sit in the clipboard or in history without aliasing anything live.
//!
//! # Example
//!
//! ```
//! use treequill::document::node::Subtree;
//!
//! let team = Subtree::new("Sales", "Sales department")
//!     .with_child(Subtree::new("Sales Team 1", "North"))
//!     .with_child(Subtree::new("Sales Team 2", "South"));
//!
//! assert_eq!(team.root_name(), "Sales");
//! assert_eq!(team.node_count(), 3);
//! assert_eq!(team.children_of(0), vec![1, 2]);
//! ```

use super::content::{Content, SharedContent};
use generational_arena::Index;
use std::collections::HashSet;

/// Stable identifier of a node attached to a `Tree`.
///
/// Ids are never reused for a different node: once a node is detached, its
/// id stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

/// A node attached to a tree.
#[derive(Debug)]
pub struct TreeNode {
    pub(crate) name: String,
    pub(crate) content: SharedContent,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl TreeNode {
    pub(crate) fn new(name: String, content: SharedContent, parent: Option<NodeId>) -> Self {
        Self {
            name,
            content,
            parent,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &SharedContent {
        &self.content
    }

    /// Parent id, `None` only for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// One node of a detached subtree.
#[derive(Debug, PartialEq)]
pub struct DetachedNode {
    pub name: String,
    pub content: SharedContent,
    /// Offset of the parent within the owning subtree, `None` for its root
    pub parent: Option<usize>,
}

/// A parent-detached subtree stored flat in pre-order.
///
/// Invariants: the root is at offset 0 and has no parent; every other node's
/// parent offset is smaller than its own; siblings appear in child order.
/// Equality is structural (names, content values, shape).
#[derive(Debug, PartialEq)]
pub struct Subtree {
    nodes: Vec<DetachedNode>,
}

impl Subtree {
    /// Creates a single-node subtree with freshly owned content.
    pub fn new(name: impl Into<String>, content: impl Into<Content>) -> Self {
        Self::with_shared(name, SharedContent::new(content.into()))
    }

    /// Creates a single-node subtree around an existing content cell.
    pub fn with_shared(name: impl Into<String>, content: SharedContent) -> Self {
        Self {
            nodes: vec![DetachedNode {
                name: name.into(),
                content,
                parent: None,
            }],
        }
    }

    /// Appends `child` as the last child of this subtree's root.
    pub fn with_child(mut self, child: Subtree) -> Self {
        let offset = self.nodes.len();
        for node in child.nodes {
            self.nodes.push(DetachedNode {
                name: node.name,
                content: node.content,
                parent: Some(node.parent.map_or(0, |p| p + offset)),
            });
        }
        self
    }

    /// Builds a subtree from nodes already in pre-order.
    pub(crate) fn from_preorder(nodes: Vec<DetachedNode>) -> Self {
        debug_assert!(!nodes.is_empty(), "a subtree has at least its root");
        debug_assert!(nodes[0].parent.is_none(), "subtree root has a parent");
        debug_assert!(nodes
            .iter()
            .enumerate()
            .skip(1)
            .all(|(i, n)| n.parent.is_some_and(|p| p < i)));
        Self { nodes }
    }

    pub fn root_name(&self) -> &str {
        &self.nodes[0].name
    }

    pub fn root_content(&self) -> &SharedContent {
        &self.nodes[0].content
    }

    /// Number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[DetachedNode] {
        &self.nodes
    }

    /// Node names in pre-order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    /// Offsets of the children of the node at `offset`, in order.
    pub fn children_of(&self, offset: usize) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent == Some(offset))
            .map(|(i, _)| i)
            .collect()
    }

    pub(crate) fn set_name(&mut self, offset: usize, name: String) {
        self.nodes[offset].name = name;
    }

    pub(crate) fn into_nodes(self) -> Vec<DetachedNode> {
        self.nodes
    }

    /// Returns the first name that appears more than once, if any.
    pub fn duplicate_name(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.names().find(|name| !seen.insert(*name))
    }

    /// Copies the subtree with every content cell cloned.
    pub fn deep_clone(&self) -> Subtree {
        Subtree {
            nodes: self
                .nodes
                .iter()
                .map(|n| DetachedNode {
                    name: n.name.clone(),
                    content: n.content.deep_clone(),
                    parent: n.parent,
                })
                .collect(),
        }
    }

    /// Height of the subtree; a single node has depth 1.
    pub fn max_depth(&self) -> usize {
        let mut depths: Vec<usize> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let depth = node.parent.map_or(1, |p| depths[p] + 1);
            depths.push(depth);
        }
        depths.into_iter().max().unwrap_or(1)
    }
}
