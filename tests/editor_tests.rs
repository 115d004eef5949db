use rstest::rstest;
use treequill::config::Config;
use treequill::document::content::Content;
use treequill::document::node::Subtree;
use treequill::document::tree::Tree;
use treequill::editor::action::Change;
use treequill::editor::clipboard::{ClipboardMode, ClipboardState};
use treequill::editor::engine::Operation;
use treequill::editor::state::EditorState;
use treequill::errors::MutationError;

fn company() -> EditorState {
    let tree = Tree::from_subtree(
        Subtree::new("Company", "Acme Corp")
            .with_child(
                Subtree::new("Sales", "Revenue")
                    .with_child(Subtree::new("Sales Team 1", "North"))
                    .with_child(Subtree::new("Sales Team 2", "South")),
            )
            .with_child(
                Subtree::new("Engineering", "Tech Team")
                    .with_child(Subtree::new("Backend", "Server Development")),
            )
            .with_child(Subtree::new("Marketing", "Growth Team")),
    )
    .unwrap();
    EditorState::new(tree)
}

fn child_names(state: &EditorState, parent: &str) -> Vec<String> {
    let tree = state.tree();
    let id = tree.require(parent).unwrap();
    tree.children(id)
        .unwrap()
        .iter()
        .map(|&c| tree.name(c).unwrap().to_string())
        .collect()
}

fn all_names_unique(state: &EditorState) -> bool {
    let tree = state.tree();
    let mut names: Vec<&str> = tree.iter(tree.root()).map(|(_, n)| n.name()).collect();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    names.len() == total && total == tree.total_nodes()
}

#[test]
fn test_copy_paste_collision_example() {
    let tree = Tree::from_subtree(
        Subtree::new("Company", "Acme Corp").with_child(Subtree::new("Sales Team 1", "North")),
    )
    .unwrap();
    let mut state = EditorState::new(tree);

    state.copy("Sales Team 1").unwrap();
    let delta = state.paste("Company").unwrap();
    assert_eq!(delta.inserted(), vec!["Sales Team 1 (1)"]);
    state.paste("Company").unwrap();

    assert_eq!(
        child_names(&state, "Company"),
        vec!["Sales Team 1", "Sales Team 1 (1)", "Sales Team 1 (2)"]
    );
    assert_eq!(state.clipboard().mode(), Some(ClipboardMode::Copy));
}

#[test]
fn test_cut_paste_round_trip() {
    let mut state = company();
    state.cut("Sales Team 1").unwrap();
    assert!(!state.tree().contains_name("Sales Team 1"));

    let delta = state.paste("Sales").unwrap();
    assert_eq!(delta.inserted(), vec!["Sales Team 1"]);
    assert!(state.clipboard().is_empty());
    assert_eq!(child_names(&state, "Sales"), vec!["Sales Team 2", "Sales Team 1"]);
}

#[test]
fn test_cut_moves_subtree_under_new_parent() {
    let mut state = company();
    state.cut("Engineering").unwrap();
    state.paste("Marketing").unwrap();

    let tree = state.tree();
    let backend = tree.require("Backend").unwrap();
    assert_eq!(
        tree.path(backend).unwrap(),
        vec!["Company", "Marketing", "Engineering", "Backend"]
    );
    assert!(tree.is_consistent());
}

#[test]
fn test_cut_paste_resolves_reintroduced_name() {
    let mut state = company();
    state.cut("Marketing").unwrap();
    state
        .insert_child("Company", Some("Marketing"), "New Growth")
        .unwrap();
    state.paste("Company").unwrap();

    assert!(state.tree().contains_name("Marketing"));
    assert!(state.tree().contains_name("Marketing (1)"));
    assert!(all_names_unique(&state));
}

#[test]
fn test_paste_resolves_colliding_descendants() {
    let mut state = company();
    state.copy("Engineering").unwrap();
    state.paste("Marketing").unwrap();

    let tree = state.tree();
    let copy = tree.require("Engineering (1)").unwrap();
    let backend = tree.child_at(copy, 0).unwrap().unwrap();
    assert_eq!(tree.name(backend).unwrap(), "Backend (1)");
    assert!(all_names_unique(&state));
}

#[test]
fn test_root_protection() {
    let mut state = company();
    let before = state.tree().clone_deep();

    assert!(matches!(
        state.cut("Company").unwrap_err(),
        MutationError::InvalidRootOperation(_)
    ));
    assert!(matches!(
        state.delete("Company").unwrap_err(),
        MutationError::InvalidRootOperation(_)
    ));
    assert!(matches!(
        state.rename("Company", "Corp").unwrap_err(),
        MutationError::InvalidRootOperation(_)
    ));
    assert_eq!(state.tree(), &before);
    assert!(state.clipboard().is_empty());
}

#[test]
fn test_copy_root_pastes_whole_tree() {
    let mut state = company();
    state.copy("Company").unwrap();
    assert!(!state.can_undo());

    let delta = state.paste("Marketing").unwrap();
    assert_eq!(delta.inserted(), vec!["Company (1)"]);

    let tree = state.tree();
    let copy = tree.require("Company (1)").unwrap();
    assert_eq!(tree.path(copy).unwrap(), vec!["Company", "Marketing", "Company (1)"]);
    assert_eq!(
        child_names(&state, "Company (1)"),
        vec!["Sales (1)", "Engineering (1)", "Marketing (1)"]
    );
    assert!(tree.contains_name("Sales Team 2 (1)"));
    assert!(tree.contains_name("Backend (1)"));
    assert_eq!(tree.total_nodes(), 14);
    assert!(all_names_unique(&state));

    state.undo().unwrap();
    assert_eq!(state.tree().total_nodes(), 7);
}

#[test]
fn test_paste_empty_clipboard() {
    let mut state = company();
    assert_eq!(
        state.paste("Company").unwrap_err(),
        MutationError::EmptyClipboard
    );
}

#[test]
fn test_unknown_nodes() {
    let mut state = company();
    let missing = MutationError::NodeNotFound("HR".to_string());
    assert_eq!(state.cut("HR").unwrap_err(), missing);
    assert_eq!(state.copy("HR").unwrap_err(), missing);
    assert_eq!(state.delete("HR").unwrap_err(), missing);
    assert_eq!(state.rename("HR", "People").unwrap_err(), missing);
    assert_eq!(state.set_content("HR", 1).unwrap_err(), missing);
}

#[test]
fn test_rename_fails_loudly_on_collision() {
    let mut state = company();
    assert_eq!(
        state.rename("Sales", "Marketing").unwrap_err(),
        MutationError::DuplicateName("Marketing".to_string())
    );

    let delta = state.rename("Sales", "Revenue").unwrap();
    assert_eq!(
        delta.changes,
        vec![Change::Renamed {
            from: "Sales".to_string(),
            to: "Revenue".to_string()
        }]
    );
    assert_eq!(
        child_names(&state, "Revenue"),
        vec!["Sales Team 1", "Sales Team 2"]
    );
}

#[test]
fn test_rename_to_same_name_is_noop() {
    let mut state = company();
    let delta = state.rename("Sales", "Sales").unwrap();
    assert!(delta.is_empty());
    assert!(!state.can_undo());
}

#[test]
fn test_delete_discards_subtree() {
    let mut state = company();
    let delta = state.delete("Engineering").unwrap();
    assert_eq!(delta.removed(), vec!["Engineering"]);
    assert!(!state.tree().contains_name("Backend"));
    assert!(state.clipboard().is_empty());
}

#[test]
fn test_batch_cut_keeps_selection_order() {
    let mut state = company();
    state
        .cut_many(&["Marketing", "Sales Team 1", "Sales", "Marketing"])
        .unwrap();

    assert_eq!(
        state.clipboard_state(),
        ClipboardState::Staged {
            mode: ClipboardMode::Cut,
            roots: vec!["Marketing".to_string(), "Sales".to_string()],
            node_count: 4,
        }
    );
    assert_eq!(child_names(&state, "Company"), vec!["Engineering"]);

    state.paste("Engineering").unwrap();
    assert_eq!(
        child_names(&state, "Engineering"),
        vec!["Backend", "Marketing", "Sales"]
    );
    assert_eq!(state.history().undo_levels(), 2);
}

#[test]
fn test_batch_with_root_changes_nothing() {
    let mut state = company();
    let before = state.tree().clone_deep();
    assert!(state.delete_many(&["Marketing", "Company"]).is_err());
    assert_eq!(state.tree(), &before);
}

#[test]
fn test_insert_generates_names() {
    let mut state = company();
    state.insert_child("Sales", None, Content::Null).unwrap();
    state.insert_child("Sales", None, Content::Null).unwrap();
    assert_eq!(
        child_names(&state, "Sales"),
        vec!["Sales Team 1", "Sales Team 2", "NewNode", "NewNode_1"]
    );

    assert_eq!(
        state
            .insert_child("Sales", Some("Backend"), Content::Null)
            .unwrap_err(),
        MutationError::DuplicateName("Backend".to_string())
    );
}

#[test]
fn test_set_content_is_seen_by_shallow_copies() {
    let mut state = company();
    let id = state.tree().require("Marketing").unwrap();
    let alias = state.tree().shallow_copy(id).unwrap();
    let independent = state.tree().deep_copy(id).unwrap();

    state.set_content("Marketing", "Brand").unwrap();
    assert_eq!(*alias.root_content().get(), Content::from("Brand"));
    assert_eq!(*independent.root_content().get(), Content::from("Growth Team"));
}

#[test]
fn test_copy_is_independent_of_tree() {
    let mut state = company();
    state.copy("Engineering").unwrap();
    state.set_content("Engineering", "Changed").unwrap();

    let staged = state.clipboard().staged().unwrap();
    assert_eq!(*staged.nodes[0].root_content().get(), Content::from("Tech Team"));

    state.paste("Company").unwrap();
    state.set_content("Engineering (1)", "Pasted").unwrap();
    let staged = state.clipboard().staged().unwrap();
    assert_eq!(*staged.nodes[0].root_content().get(), Content::from("Tech Team"));
}

#[test]
fn test_perform_matches_convenience_methods() {
    let mut state = company();
    let delta = state
        .perform(Operation::Delete(vec!["Backend".to_string()]))
        .unwrap();
    assert_eq!(
        delta.changes,
        vec![Change::Removed {
            parent: "Engineering".to_string(),
            index: 0,
            name: "Backend".to_string()
        }]
    );
}

#[test]
fn test_uniqueness_over_mixed_sequence() {
    let mut state = company();
    state.copy_many(&["Sales", "Engineering"]).unwrap();
    state.paste("Marketing").unwrap();
    state.paste("Marketing").unwrap();
    state.cut("Sales (1)").unwrap();
    state.paste("Backend").unwrap();
    state.rename("Backend", "Platform").unwrap();
    state.undo().unwrap();
    state.undo().unwrap();
    state.redo().unwrap();
    state.delete("Sales Team 1 (2)").unwrap();

    assert!(all_names_unique(&state));
    assert!(state.tree().is_consistent());
}

/// Small deterministic generator so failing seeds can be replayed.
struct Lcg(u64);

impl Lcg {
    fn below(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

fn pick(state: &EditorState, rng: &mut Lcg) -> String {
    let tree = state.tree();
    let names: Vec<&str> = tree.iter(tree.root()).map(|(_, n)| n.name()).collect();
    names[rng.below(names.len())].to_string()
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(42)]
#[case(1234)]
#[case(99991)]
fn test_random_sequences_keep_names_unique_and_history_reversible(#[case] seed: u64) {
    let config = Config {
        undo_limit: 0,
        ..Config::default()
    };
    let mut state = EditorState::with_config(company().into_tree(), &config);
    let initial = state.tree().clone_deep();
    let mut rng = Lcg(seed);

    for step in 0..80 {
        let node = pick(&state, &mut rng);
        // Failures (root, empty clipboard, empty history) are part of the mix
        // and must leave everything intact.
        let _ = match rng.below(9) {
            0 => state.cut(&node).map(|_| ()),
            1 => state.copy(&node).map(|_| ()),
            2 | 3 => state.paste(&node).map(|_| ()),
            4 => state.delete(&node).map(|_| ()),
            5 => state.rename(&node, &format!("Node {}", step)).map(|_| ()),
            6 => state.set_content(&node, step as i64).map(|_| ()),
            7 => state.insert_child(&node, None, Content::Null).map(|_| ()),
            _ => {
                if rng.below(2) == 0 {
                    let _ = state.undo();
                } else {
                    let _ = state.redo();
                }
                Ok(())
            }
        };
        assert!(state.tree().is_consistent(), "seed {} step {}", seed, step);
        assert!(all_names_unique(&state), "seed {} step {}", seed, step);
    }

    let k = state.history().undo_levels();
    let after = state.tree().clone_deep();
    for _ in 0..k {
        state.undo().unwrap();
        assert!(state.tree().is_consistent());
    }
    assert_eq!(state.tree(), &initial);

    for _ in 0..k {
        state.redo().unwrap();
    }
    assert_eq!(state.tree(), &after);
}
