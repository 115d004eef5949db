use treequill::document::content::Content;
use treequill::document::node::Subtree;
use treequill::document::tree::Tree;
use treequill::errors::TreeError;

fn company() -> Tree {
    Tree::from_subtree(
        Subtree::new("Company", "Acme Corp")
            .with_child(
                Subtree::new("Engineering", "Tech Team")
                    .with_child(Subtree::new("Backend", "Server Development"))
                    .with_child(Subtree::new("Frontend", "UI Development")),
            )
            .with_child(Subtree::new("Marketing", "Growth Team")),
    )
    .unwrap()
}

#[test]
fn test_lookup_and_path() {
    let tree = company();
    let backend = tree.find_by_name("Backend").unwrap();
    assert_eq!(tree.path(backend).unwrap(), vec!["Company", "Engineering", "Backend"]);
    assert_eq!(tree.depth(backend).unwrap(), 2);
    assert_eq!(tree.depth(tree.root()).unwrap(), 0);
    assert!(tree.find_by_name("Sales").is_none());
    assert_eq!(
        tree.require("Sales").unwrap_err(),
        TreeError::NodeNotFound("Sales".to_string())
    );
}

#[test]
fn test_statistics() {
    let tree = company();
    let root = tree.root();
    assert_eq!(tree.node_count(root).unwrap(), 5);
    assert_eq!(tree.max_depth(root).unwrap(), 3);
    assert_eq!(tree.subtree_width(root).unwrap(), 2);

    let marketing = tree.require("Marketing").unwrap();
    assert_eq!(tree.node_count(marketing).unwrap(), 1);
    assert_eq!(tree.max_depth(marketing).unwrap(), 1);
    assert_eq!(tree.subtree_width(marketing).unwrap(), 1);
}

#[test]
fn test_child_lookup() {
    let tree = company();
    let engineering = tree.require("Engineering").unwrap();
    let frontend = tree.require("Frontend").unwrap();

    assert_eq!(tree.child_by_name(engineering, "Frontend").unwrap(), Some(frontend));
    assert_eq!(tree.child_by_name(engineering, "Marketing").unwrap(), None);
    assert_eq!(tree.child_at(engineering, -1).unwrap(), Some(frontend));
    assert_eq!(tree.child_at(engineering, 5).unwrap(), None);
}

#[test]
fn test_add_child_rejects_duplicates_atomically() {
    let mut tree = company();
    let root = tree.root();
    let before = tree.clone_deep();

    let incoming = Subtree::new("HR", "Human Resources").with_child(Subtree::new("Backend", ""));
    assert_eq!(
        tree.add_child(root, incoming, None).unwrap_err(),
        TreeError::DuplicateName("Backend".to_string())
    );
    assert_eq!(tree, before);
    assert!(!tree.contains_name("HR"));
}

#[test]
fn test_add_child_at_index() {
    let mut tree = company();
    let root = tree.root();
    let hr = tree
        .add_child(root, Subtree::new("HR", "Human Resources"), Some(0))
        .unwrap();
    assert_eq!(tree.children(root).unwrap()[0], hr);
    assert_eq!(tree.parent(hr).unwrap(), Some(root));
    assert!(tree.is_consistent());
}

#[test]
fn test_remove_child_unindexes_subtree() {
    let mut tree = company();
    let root = tree.root();
    let engineering = tree.require("Engineering").unwrap();

    let detached = tree.remove_child(root, engineering).unwrap();
    let names: Vec<&str> = detached.names().collect();
    assert_eq!(names, vec!["Engineering", "Backend", "Frontend"]);
    assert!(!tree.contains_name("Backend"));
    assert_eq!(tree.total_nodes(), 2);
    assert!(tree.is_consistent());
}

#[test]
fn test_root_cannot_be_detached_or_renamed() {
    let mut tree = company();
    let root = tree.root();
    assert!(matches!(
        tree.detach(root).unwrap_err(),
        TreeError::InvalidRootOperation(_)
    ));
    assert!(matches!(
        tree.rename(root, "Corp").unwrap_err(),
        TreeError::InvalidRootOperation(_)
    ));
    assert_eq!(tree.name(root).unwrap(), "Company");
}

#[test]
fn test_shallow_copy_shares_content() {
    let tree = company();
    let engineering = tree.require("Engineering").unwrap();

    let copy = tree.shallow_copy(engineering).unwrap();
    assert_eq!(copy.node_count(), 1);
    assert!(copy
        .root_content()
        .ptr_eq(tree.content(engineering).unwrap()));

    tree.content(engineering)
        .unwrap()
        .replace(Content::from("Platform"));
    assert_eq!(*copy.root_content().get(), Content::from("Platform"));
}

#[test]
fn test_deep_copy_is_independent() {
    let mut tree = company();
    let engineering = tree.require("Engineering").unwrap();

    let copy = tree.deep_copy(engineering).unwrap();
    assert_eq!(copy.node_count(), 3);
    tree.set_content(engineering, Content::from("Platform")).unwrap();
    assert_eq!(*copy.root_content().get(), Content::from("Tech Team"));
}

#[test]
fn test_whole_tree_copies() {
    let tree = company();
    let deep = tree.clone_deep();
    assert_eq!(deep, tree);

    let shallow = tree.clone_shallow();
    assert_eq!(shallow.total_nodes(), 1);
    assert!(shallow
        .content(shallow.root())
        .unwrap()
        .ptr_eq(tree.content(tree.root()).unwrap()));
}

#[test]
fn test_summary_truncates_content() {
    let tree = company();
    let summary = tree.summary(tree.root(), 6).unwrap();
    assert_eq!(
        summary,
        "Company: Acm...\n  - Max Depth: 3\n  - Max Width: 2\n  - Node Count: 5"
    );
}

#[test]
fn test_draw() {
    let tree = company();
    let drawing = tree.draw(tree.root(), None).unwrap();
    let expected = "\
└── Company: Acme Corp
    ├── Engineering: Tech Team
    │   ├── Backend: Server Development
    │   └── Frontend: UI Development
    └── Marketing: Growth Team
";
    assert_eq!(drawing, expected);
}

#[test]
fn test_draw_with_key() {
    let mut tree = Tree::new("root", Content::Null);
    let root = tree.root();
    let content: Content = serde_json::from_str(r#"{"definition": "Sales department", "size": 3}"#).unwrap();
    tree.add_child(root, Subtree::new("Sales", content), None).unwrap();

    let drawing = tree.draw(root, Some("definition")).unwrap();
    assert_eq!(drawing, "└── root: null\n    └── Sales: Sales department\n");
}

#[test]
fn test_iterative_traversal_handles_deep_chains() {
    let mut tree = Tree::new("root", Content::Null);
    let mut parent = tree.root();
    for i in 0..10_000 {
        parent = tree
            .add_child(parent, Subtree::new(format!("n{}", i), i as i64), None)
            .unwrap();
    }
    let root = tree.root();
    assert_eq!(tree.max_depth(root).unwrap(), 10_001);
    assert_eq!(tree.clone_deep(), tree);
    assert!(tree.is_consistent());
}
