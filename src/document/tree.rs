//! Arena-backed tree with a tree-wide name index.
//!
//! `Tree` owns every attached node in a generational arena. Parent and child
//! links are `NodeId`s, so there is no ownership cycle, and a name index maps
//! each (unique) name to its node for O(1) lookup.
//!
//! All traversals are iterative; pathologically deep trees cost heap, not
//! stack.
//!
//! # Example
//!
//! ```
//! use treequill::document::node::Subtree;
//! use treequill::document::tree::Tree;
//!
//! let mut tree = Tree::new("Company", "Acme Corp");
//! let root = tree.root();
//! let sales = tree
//!     .add_child(root, Subtree::new("Sales", "Sales department"), None)
//!     .unwrap();
//! tree.add_child(sales, Subtree::new("Sales Team 1", "North"), None).unwrap();
//!
//! let team = tree.find_by_name("Sales Team 1").unwrap();
//! assert_eq!(tree.path(team).unwrap(), vec!["Company", "Sales", "Sales Team 1"]);
//! assert_eq!(tree.depth(team).unwrap(), 2);
//! assert_eq!(tree.node_count(root).unwrap(), 3);
//! ```

use super::content::{Content, SharedContent};
use super::node::{DetachedNode, NodeId, Subtree, TreeNode};
use crate::errors::{TreeError, TreeResult};
use generational_arena::Arena;
use std::collections::HashMap;
use tracing::instrument;

/// A rooted tree of uniquely named nodes.
#[derive(Debug)]
pub struct Tree {
    arena: Arena<TreeNode>,
    root: NodeId,
    index: HashMap<String, NodeId>,
}

impl Tree {
    /// Creates a tree holding only a root node.
    pub fn new(root_name: impl Into<String>, content: impl Into<Content>) -> Self {
        let mut arena = Arena::new();
        let mut index = HashMap::new();
        let root = Self::materialize(
            &mut arena,
            &mut index,
            None,
            Subtree::new(root_name, content),
        );
        Self { arena, root, index }
    }

    /// Builds a tree whose root is the root of `subtree`.
    ///
    /// Fails with `DuplicateName` if any name appears twice.
    pub fn from_subtree(subtree: Subtree) -> TreeResult<Self> {
        if let Some(name) = subtree.duplicate_name() {
            return Err(TreeError::DuplicateName(name.to_string()));
        }
        let mut arena = Arena::new();
        let mut index = HashMap::new();
        let root = Self::materialize(&mut arena, &mut index, None, subtree);
        Ok(Self { arena, root, index })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &TreeNode {
        &self.arena[self.root.0]
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        id == self.root
    }

    /// Returns the node for `id`, or `None` if it is not attached.
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.arena.get(id.0)
    }

    pub(crate) fn get(&self, id: NodeId) -> TreeResult<&TreeNode> {
        self.arena
            .get(id.0)
            .ok_or_else(|| TreeError::NodeNotFound(format!("{:?}", id)))
    }

    /// Total number of attached nodes.
    pub fn total_nodes(&self) -> usize {
        self.arena.len()
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Like `find_by_name`, but a miss is a `NodeNotFound` error.
    pub fn require(&self, name: &str) -> TreeResult<NodeId> {
        self.find_by_name(name)
            .ok_or_else(|| TreeError::NodeNotFound(name.to_string()))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All names currently in the tree, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    pub fn name(&self, id: NodeId) -> TreeResult<&str> {
        Ok(self.get(id)?.name())
    }

    pub fn content(&self, id: NodeId) -> TreeResult<&SharedContent> {
        Ok(self.get(id)?.content())
    }

    pub fn children(&self, id: NodeId) -> TreeResult<&[NodeId]> {
        Ok(self.get(id)?.children())
    }

    pub fn parent(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.get(id)?.parent())
    }

    /// Parent and index among its siblings; `None` for the root.
    pub fn position(&self, id: NodeId) -> TreeResult<Option<(NodeId, usize)>> {
        let Some(parent) = self.get(id)?.parent else {
            return Ok(None);
        };
        let index = self
            .get(parent)?
            .children
            .iter()
            .position(|&c| c == id)
            .ok_or_else(|| TreeError::NodeNotFound(format!("{:?}", id)))?;
        Ok(Some((parent, index)))
    }

    /// Finds a direct child by name.
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> TreeResult<Option<NodeId>> {
        Ok(self
            .get(parent)?
            .children
            .iter()
            .copied()
            .find(|&c| self.arena.get(c.0).is_some_and(|n| n.name == name)))
    }

    /// Finds a direct child by index; negative indices count from the end.
    pub fn child_at(&self, parent: NodeId, index: isize) -> TreeResult<Option<NodeId>> {
        let children = &self.get(parent)?.children;
        let resolved = if index < 0 {
            children.len().checked_sub(index.unsigned_abs())
        } else {
            Some(index as usize)
        };
        Ok(resolved.and_then(|i| children.get(i).copied()))
    }

    /// Iterates the subtree rooted at `from` in pre-order.
    pub fn iter(&self, from: NodeId) -> PreOrder<'_> {
        PreOrder::new(self, from)
    }

    /// Inserts `subtree` as a child of `parent`.
    ///
    /// `index` defaults to the end and is clamped to the number of children.
    /// Fails with `DuplicateName` (and changes nothing) if any name in the
    /// subtree is already in the tree or repeated within the subtree.
    #[instrument(level = "trace", skip(self, subtree), fields(name = subtree.root_name()))]
    pub fn add_child(
        &mut self,
        parent: NodeId,
        subtree: Subtree,
        index: Option<usize>,
    ) -> TreeResult<NodeId> {
        self.get(parent)?;
        self.check_insertable(&subtree)?;

        let id = Self::materialize(&mut self.arena, &mut self.index, Some(parent), subtree);
        let children = &mut self.arena[parent.0].children;
        let at = index.unwrap_or(children.len()).min(children.len());
        children.insert(at, id);
        Ok(id)
    }

    /// Fails if any name in `subtree` would collide on insertion.
    pub fn check_insertable(&self, subtree: &Subtree) -> TreeResult<()> {
        if let Some(name) = subtree.duplicate_name() {
            return Err(TreeError::DuplicateName(name.to_string()));
        }
        match subtree.names().find(|name| self.contains_name(name)) {
            Some(name) => Err(TreeError::DuplicateName(name.to_string())),
            None => Ok(()),
        }
    }

    /// Detaches `child` from `parent` and returns it as a subtree.
    ///
    /// Content cells move with the nodes; nothing is cloned.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<Subtree> {
        if self.is_root(child) {
            return Err(TreeError::InvalidRootOperation(
                "cannot remove the root".to_string(),
            ));
        }
        if self.get(child)?.parent != Some(parent) {
            return Err(TreeError::NodeNotFound(format!(
                "{} is not a child of {}",
                self.get(child)?.name,
                self.get(parent)?.name
            )));
        }
        Ok(self.detach(child)?.2)
    }

    /// Detaches `node` from wherever it is, returning its former parent, its
    /// former index among its siblings, and the detached subtree.
    #[instrument(level = "trace", skip(self))]
    pub fn detach(&mut self, node: NodeId) -> TreeResult<(NodeId, usize, Subtree)> {
        if self.is_root(node) {
            return Err(TreeError::InvalidRootOperation(
                "cannot detach the root".to_string(),
            ));
        }
        let (parent, index) = self
            .position(node)?
            .ok_or_else(|| TreeError::InvalidRootOperation("node has no parent".to_string()))?;

        let (subtree, ids) = self.collect(node, false)?;
        self.arena[parent.0].children.remove(index);
        for id in ids {
            if let Some(removed) = self.arena.remove(id.0) {
                self.index.remove(&removed.name);
            }
        }
        Ok((parent, index, subtree))
    }

    /// Renames `node`, returning its previous name.
    ///
    /// The root's name is reserved. Renaming a node to its current name is a
    /// no-op.
    #[instrument(level = "trace", skip(self))]
    pub fn rename(&mut self, node: NodeId, new_name: &str) -> TreeResult<String> {
        if self.is_root(node) {
            return Err(TreeError::InvalidRootOperation(
                "the root name is reserved".to_string(),
            ));
        }
        let old_name = self.get(node)?.name.clone();
        if old_name == new_name {
            return Ok(old_name);
        }
        if self.contains_name(new_name) {
            return Err(TreeError::DuplicateName(new_name.to_string()));
        }
        self.index.remove(&old_name);
        self.index.insert(new_name.to_string(), node);
        self.arena[node.0].name = new_name.to_string();
        Ok(old_name)
    }

    /// Replaces the content of `node` in place, returning the previous value.
    pub fn set_content(&mut self, node: NodeId, content: Content) -> TreeResult<Content> {
        Ok(self.get(node)?.content.replace(content))
    }

    /// Names from the root down to `node`, inclusive.
    pub fn path(&self, node: NodeId) -> TreeResult<Vec<String>> {
        let mut names = vec![self.get(node)?.name.clone()];
        let mut current = self.get(node)?.parent;
        while let Some(id) = current {
            let n = self.get(id)?;
            names.push(n.name.clone());
            current = n.parent;
        }
        names.reverse();
        Ok(names)
    }

    /// Number of edges between the root and `node`; the root has depth 0.
    pub fn depth(&self, node: NodeId) -> TreeResult<usize> {
        let mut depth = 0;
        let mut current = self.get(node)?.parent;
        while let Some(id) = current {
            depth += 1;
            current = self.get(id)?.parent;
        }
        Ok(depth)
    }

    /// Height of the subtree rooted at `node`; a leaf has depth 1.
    pub fn max_depth(&self, node: NodeId) -> TreeResult<usize> {
        self.get(node)?;
        let mut deepest = 0;
        let mut stack = vec![(node, 1usize)];
        while let Some((id, level)) = stack.pop() {
            deepest = deepest.max(level);
            for &child in &self.arena[id.0].children {
                stack.push((child, level + 1));
            }
        }
        Ok(deepest)
    }

    /// Largest number of children any node in the subtree has; at least 1.
    pub fn subtree_width(&self, node: NodeId) -> TreeResult<usize> {
        self.get(node)?;
        Ok(self
            .iter(node)
            .map(|(_, n)| n.children.len())
            .max()
            .unwrap_or(0)
            .max(1))
    }

    /// Number of nodes in the subtree rooted at `node`, including itself.
    pub fn node_count(&self, node: NodeId) -> TreeResult<usize> {
        self.get(node)?;
        Ok(self.iter(node).count())
    }

    /// A single-node copy: same name, the same content cell, no children.
    pub fn shallow_copy(&self, node: NodeId) -> TreeResult<Subtree> {
        let n = self.get(node)?;
        Ok(Subtree::with_shared(n.name.clone(), n.content.clone()))
    }

    /// A full copy of the subtree with every content cell cloned.
    pub fn deep_copy(&self, node: NodeId) -> TreeResult<Subtree> {
        Ok(self.collect(node, true)?.0)
    }

    /// Copies the whole tree, content included.
    pub fn clone_deep(&self) -> Tree {
        let mut arena = Arena::new();
        let mut index = HashMap::new();
        let subtree = self.collect_unchecked(self.root, true).0;
        let root = Self::materialize(&mut arena, &mut index, None, subtree);
        Tree { arena, root, index }
    }

    /// A new tree holding only a shallow copy of this tree's root.
    pub fn clone_shallow(&self) -> Tree {
        let root = self.root_node();
        let subtree = Subtree::with_shared(root.name.clone(), root.content.clone());
        let mut arena = Arena::new();
        let mut index = HashMap::new();
        let root = Self::materialize(&mut arena, &mut index, None, subtree);
        Tree { arena, root, index }
    }

    /// Multi-line summary of the subtree rooted at `node`, with content
    /// truncated to `width` characters.
    pub fn summary(&self, node: NodeId, width: usize) -> TreeResult<String> {
        let n = self.get(node)?;
        let mut content = n.content.get().display_text();
        if content.chars().count() > width {
            content = content
                .chars()
                .take(width.saturating_sub(3))
                .chain("...".chars())
                .collect();
        }
        Ok(format!(
            "{}: {}\n  - Max Depth: {}\n  - Max Width: {}\n  - Node Count: {}",
            n.name,
            content,
            self.max_depth(node)?,
            self.subtree_width(node)?,
            self.node_count(node)?
        ))
    }

    /// Box-drawing rendering of the subtree rooted at `node`, one line per
    /// node. When `key` is given and a node's content is a mapping holding
    /// that key, only that value is shown.
    pub fn draw(&self, node: NodeId, key: Option<&str>) -> TreeResult<String> {
        self.get(node)?;
        let mut out = String::new();
        let mut stack = vec![(node, String::new(), true)];
        while let Some((id, prefix, is_last)) = stack.pop() {
            let n = &self.arena[id.0];
            let connector = if is_last { "└── " } else { "├── " };
            let content = n.content.get();
            let shown = match key.and_then(|k| content.get(k)) {
                Some(value) => value.display_text(),
                None => content.display_text(),
            };
            out.push_str(&format!("{}{}{}: {}\n", prefix, connector, n.name, shown));

            let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
            let count = n.children.len();
            for (i, &child) in n.children.iter().enumerate().rev() {
                stack.push((child, child_prefix.clone(), i + 1 == count));
            }
        }
        Ok(out)
    }

    /// Checks every structural invariant: mutual parent/child links, a
    /// parentless root, full reachability, and an index that exactly matches
    /// the attached names.
    pub fn is_consistent(&self) -> bool {
        if self.root_node().parent.is_some() {
            return false;
        }
        for (idx, node) in self.arena.iter() {
            let id = NodeId(idx);
            for &child in &node.children {
                if self.arena.get(child.0).map(|c| c.parent) != Some(Some(id)) {
                    return false;
                }
            }
            if let Some(parent) = node.parent {
                let Some(p) = self.arena.get(parent.0) else {
                    return false;
                };
                if p.children.iter().filter(|&&c| c == id).count() != 1 {
                    return false;
                }
            }
            if self.index.get(&node.name) != Some(&id) {
                return false;
            }
        }
        self.index.len() == self.arena.len() && self.iter(self.root).count() == self.arena.len()
    }

    /// Allocates arena slots for `subtree`, registers its names, and links
    /// its root to `parent` (without touching the parent's child list).
    fn materialize(
        arena: &mut Arena<TreeNode>,
        index: &mut HashMap<String, NodeId>,
        parent: Option<NodeId>,
        subtree: Subtree,
    ) -> NodeId {
        let nodes = subtree.into_nodes();
        let mut ids: Vec<NodeId> = Vec::with_capacity(nodes.len());
        for node in nodes {
            let parent_id = match node.parent {
                Some(offset) => Some(ids[offset]),
                None => parent,
            };
            let id = NodeId(arena.insert(TreeNode::new(
                node.name.clone(),
                node.content,
                parent_id,
            )));
            if let Some(offset) = node.parent {
                if let Some(p) = arena.get_mut(ids[offset].0) {
                    p.children.push(id);
                }
            }
            index.insert(node.name, id);
            ids.push(id);
        }
        ids[0]
    }

    fn collect(&self, from: NodeId, deep: bool) -> TreeResult<(Subtree, Vec<NodeId>)> {
        self.get(from)?;
        Ok(self.collect_unchecked(from, deep))
    }

    /// Flattens the subtree at `from` into pre-order. Content cells are
    /// aliased unless `deep` is set.
    fn collect_unchecked(&self, from: NodeId, deep: bool) -> (Subtree, Vec<NodeId>) {
        let mut nodes = Vec::new();
        let mut ids = Vec::new();
        let mut stack: Vec<(NodeId, Option<usize>)> = vec![(from, None)];
        while let Some((id, parent)) = stack.pop() {
            let Some(node) = self.arena.get(id.0) else {
                continue;
            };
            let offset = nodes.len();
            nodes.push(DetachedNode {
                name: node.name.clone(),
                content: if deep {
                    node.content.deep_clone()
                } else {
                    node.content.clone()
                },
                parent,
            });
            ids.push(id);
            for &child in node.children.iter().rev() {
                stack.push((child, Some(offset)));
            }
        }
        (Subtree::from_preorder(nodes), ids)
    }
}

impl PartialEq for Tree {
    /// Structural equality: same names, content values and child order.
    fn eq(&self, other: &Self) -> bool {
        self.arena.len() == other.arena.len()
            && self.collect_unchecked(self.root, false).0
                == other.collect_unchecked(other.root, false).0
    }
}

/// Pre-order iterator over a subtree.
pub struct PreOrder<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> PreOrder<'a> {
    fn new(tree: &'a Tree, from: NodeId) -> Self {
        let stack = if tree.node(from).is_some() {
            vec![from]
        } else {
            Vec::new()
        };
        Self { tree, stack }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id)?;
        // Reverse so the leftmost child comes out first
        self.stack.extend(node.children.iter().rev().copied());
        Some((id, node))
    }
}
