//! Tree file saving.
//!
//! Trees are written in the node document format with atomic replacement and
//! an optional `.bak` copy of the previous file. Targets ending in `.gz` are
//! gzip-compressed.

use crate::config::Config;
use crate::document::stream::write_document;
use crate::document::tree::Tree;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

fn create_backup<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let mut backup_path = path.to_path_buf();
    let original_name = backup_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid file name"))?;
    backup_path.set_file_name(format!("{}.bak", original_name));
    fs::copy(path, backup_path).context("Failed to create backup")?;
    Ok(())
}

/// Saves `tree` to `path`.
///
/// Uses `config.indent_size` for indentation and honors
/// `config.create_backup` when the file already exists.
pub fn save_tree_file<P: AsRef<Path>>(path: P, tree: &Tree, config: &Config) -> Result<()> {
    let path = path.as_ref();
    let should_compress = path.to_string_lossy().ends_with(".gz");

    if config.create_backup && path.exists() {
        create_backup(path)?;
    }

    let mut json = serialize_tree(tree, config.indent_size)?;
    json.push('\n');
    write_file_atomic(path, json.as_bytes(), should_compress)?;
    debug!(path = %path.display(), nodes = tree.total_nodes(), "saved tree");
    Ok(())
}

/// Pretty-prints the tree's node document with `indent_size` spaces.
pub fn serialize_tree(tree: &Tree, indent_size: usize) -> Result<String> {
    let indent = " ".repeat(indent_size);
    let mut out = Vec::new();
    write_document(tree, &mut out, indent.as_bytes()).context("Failed to serialize tree")?;
    String::from_utf8(out).context("Serialized tree is not valid UTF-8")
}

fn write_file_atomic<P: AsRef<Path>>(path: P, data: &[u8], compress: bool) -> Result<()> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let path = path.as_ref();
    let temp_path = path.with_extension("tmp");

    if compress {
        let file = fs::File::create(&temp_path).context("Failed to create temp file")?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(data)
            .context("Failed to write compressed data")?;
        encoder.finish().context("Failed to finish compression")?;
    } else {
        fs::write(&temp_path, data).context("Failed to write temp file")?;
    }

    fs::rename(&temp_path, path).context("Failed to rename temp file")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::Subtree;

    #[test]
    fn test_serialize_uses_indent_size() {
        let tree = Tree::from_subtree(Subtree::new("root", 1)).unwrap();
        let json = serialize_tree(&tree, 4).unwrap();
        assert!(json.contains("\n    \"name\": \"root\""));
    }

    #[test]
    fn test_backup_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        fs::write(&path, "old").unwrap();

        let config = Config {
            create_backup: true,
            ..Config::default()
        };
        save_tree_file(&path, &Tree::new("root", ""), &config).unwrap();

        let backup = dir.path().join("tree.json.bak");
        assert_eq!(fs::read_to_string(backup).unwrap(), "old");
        assert!(fs::read_to_string(&path).unwrap().contains("\"root\""));
    }
}
