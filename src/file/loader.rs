//! Tree file loading.
//!
//! Files hold one JSON document in the node format (`name`, `content`,
//! `children`). Files ending in `.gz` are decompressed first.

use crate::document::stream::read_document;
use crate::document::tree::Tree;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Loads a tree from a JSON (or gzipped JSON) file.
///
/// # Examples
///
/// ```no_run
/// use treequill::file::loader::load_tree_file;
///
/// let tree = load_tree_file("company.json").unwrap();
/// println!("{} nodes", tree.total_nodes());
/// ```
///
/// # Errors
///
/// Fails if the file cannot be read or decompressed, is not a valid node
/// document, or repeats a node name.
pub fn load_tree_file<P: AsRef<Path>>(path: P) -> Result<Tree> {
    let path_ref = path.as_ref();

    let is_gzipped = path_ref
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let content = if is_gzipped {
        read_gzipped_file(path_ref)?
    } else {
        fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read file {}", path_ref.display()))?
    };

    let tree = parse_tree(&content)
        .with_context(|| format!("Failed to load tree from {}", path_ref.display()))?;
    debug!(path = %path_ref.display(), nodes = tree.total_nodes(), "loaded tree");
    Ok(tree)
}

/// Parses a node document from JSON text. Nesting depth is unbounded.
pub fn parse_tree(content: &str) -> Result<Tree> {
    let subtree = read_document(content).context("Failed to parse JSON")?;
    Ok(Tree::from_subtree(subtree)?)
}

/// Loads a tree from standard input.
pub fn load_tree_from_stdin() -> Result<Tree> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;
    parse_tree(&buffer)
}

fn read_gzipped_file<P: AsRef<Path>>(path: P) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let file = fs::File::open(path.as_ref()).context("Failed to open gzipped file")?;
    let mut decoder = GzDecoder::new(file);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzip file")?;
    Ok(content)
}
