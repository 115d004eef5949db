//! Editing operations and their history.
//!
//! # Modules
//!
//! - `names`: collision-free name derivation
//! - `clipboard`: the single-slot clipboard
//! - `action`: reversible action descriptors
//! - `engine`: the mutation operations
//! - `history`: bounded undo/redo stacks
//! - `state`: the editing session tying them together
//!
//! # Example
//!
//! ```
//! use treequill::document::tree::Tree;
//! use treequill::editor::state::EditorState;
//!
//! let mut state = EditorState::new(Tree::new("root", ""));
//! state.insert_child("root", Some("notes"), "hello").unwrap();
//! assert!(state.can_undo());
//! ```

pub mod action;
pub mod clipboard;
pub mod engine;
pub mod history;
pub mod names;
pub mod state;
