//! Name collision resolution.
//!
//! Node names are unique across a whole tree. When a paste would introduce a
//! name that is already taken, the resolver derives a free one by appending
//! `" (k)"` for the smallest `k >= 1` that is unused.
//!
//! # Example
//!
//! ```
//! use treequill::document::node::Subtree;
//! use treequill::document::tree::Tree;
//! use treequill::editor::names::NameResolver;
//!
//! let mut tree = Tree::new("Company", "Acme Corp");
//! let root = tree.root();
//! tree.add_child(root, Subtree::new("Sales Team 1", ""), None).unwrap();
//!
//! assert_eq!(NameResolver::resolve("Marketing", &tree), "Marketing");
//! assert_eq!(NameResolver::resolve("Sales Team 1", &tree), "Sales Team 1 (1)");
//! ```

use crate::document::node::Subtree;
use crate::document::tree::Tree;
use std::collections::HashSet;
use tracing::trace;

/// Derives collision-free node names.
pub struct NameResolver;

impl NameResolver {
    /// Returns `candidate` if the tree does not use it, otherwise the first
    /// free `"candidate (k)"`.
    pub fn resolve(candidate: &str, tree: &Tree) -> String {
        Self::resolve_with(candidate, |name| tree.contains_name(name))
    }

    /// Same as `resolve`, against an arbitrary "is this name taken" test.
    pub fn resolve_with(candidate: &str, taken: impl Fn(&str) -> bool) -> String {
        if !taken(candidate) {
            return candidate.to_string();
        }
        let mut k = 1u64;
        loop {
            let attempt = format!("{} ({})", candidate, k);
            if !taken(&attempt) {
                trace!(candidate, resolved = %attempt, "resolved name collision");
                return attempt;
            }
            k += 1;
        }
    }

    /// Renames every node of `batch` that collides with the tree or with a
    /// name already assigned earlier in the same batch.
    ///
    /// Subtrees are visited in batch order and each subtree in pre-order, so
    /// an ancestor always settles its name before its descendants are
    /// checked, and later siblings see the names earlier ones settled on.
    /// Nodes that collide with nothing keep their names.
    pub fn resolve_batch(tree: &Tree, batch: &mut [Subtree]) {
        let mut assigned: HashSet<String> = HashSet::new();
        for subtree in batch.iter_mut() {
            for offset in 0..subtree.node_count() {
                let candidate = subtree.nodes()[offset].name.clone();
                let resolved = Self::resolve_with(&candidate, |name| {
                    tree.contains_name(name) || assigned.contains(name)
                });
                if resolved != candidate {
                    subtree.set_name(offset, resolved.clone());
                }
                assigned.insert(resolved);
            }
        }
    }

    /// Picks a name for a brand-new node: `base` if free, else the first free
    /// of `base_1`, `base_2`, ...
    pub fn sequential(base: &str, tree: &Tree) -> String {
        if !tree.contains_name(base) {
            return base.to_string();
        }
        let mut k = 1u64;
        loop {
            let attempt = format!("{}_{}", base, k);
            if !tree.contains_name(&attempt) {
                return attempt;
            }
            k += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(names: &[&str]) -> Tree {
        let mut tree = Tree::new("root", "");
        let root = tree.root();
        for name in names {
            tree.add_child(root, Subtree::new(*name, ""), None).unwrap();
        }
        tree
    }

    #[test]
    fn test_free_name_is_unchanged() {
        let tree = tree_with(&["a"]);
        assert_eq!(NameResolver::resolve("b", &tree), "b");
    }

    #[test]
    fn test_smallest_free_suffix_is_used() {
        let tree = tree_with(&["a", "a (1)", "a (3)"]);
        assert_eq!(NameResolver::resolve("a", &tree), "a (2)");
    }

    #[test]
    fn test_batch_resolution_respects_earlier_assignments() {
        let tree = tree_with(&["team", "lead"]);
        let mut batch = vec![
            Subtree::new("team", "").with_child(Subtree::new("lead", "")),
            Subtree::new("team", "").with_child(Subtree::new("member", "")),
        ];

        NameResolver::resolve_batch(&tree, &mut batch);

        let first: Vec<&str> = batch[0].names().collect();
        let second: Vec<&str> = batch[1].names().collect();
        assert_eq!(first, vec!["team (1)", "lead (1)"]);
        assert_eq!(second, vec!["team (2)", "member"]);
    }

    #[test]
    fn test_sequential_names() {
        let tree = tree_with(&["NewNode", "NewNode_1"]);
        assert_eq!(NameResolver::sequential("NewNode", &tree), "NewNode_2");
        assert_eq!(NameResolver::sequential("Other", &tree), "Other");
    }
}
