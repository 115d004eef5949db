//! File I/O for trees.
//!
//! Loads node documents from disk or stdin and saves trees back with atomic
//! writes and optional backups.

pub mod loader;
pub mod saver;
