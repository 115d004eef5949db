//! Configuration system for treequill.
//!
//! Settings are read from a TOML file with every field optional; missing
//! fields fall back to their defaults.
//!
//! # Example
//!
//! ```
//! use treequill::config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.undo_limit, 20);
//! assert_eq!(config.new_node_name, "NewNode");
//!
//! let custom = Config {
//!     undo_limit: 100,
//!     ..Config::default()
//! };
//! assert_eq!(custom.indent_size, 2);
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the treequill application.
///
/// # Fields
///
/// * `undo_limit` - Maximum number of undo levels, `0` for unbounded (default: 20)
/// * `new_node_name` - Base name for inserted nodes without a name (default: "NewNode")
/// * `root_name` - Root name of the empty tree started for a FILE that does not exist yet (default: "root")
/// * `indent_size` - Spaces per indentation level when saving (default: 2)
/// * `create_backup` - Create .bak files before saving (default: false)
/// * `summary_width` - Maximum width of the content line in summaries (default: 40)
/// * `draw_key` - Content key shown by `--draw` for map content (default: none)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Maximum number of undo levels to keep
    #[serde(default = "default_undo_limit")]
    pub undo_limit: usize,

    #[serde(default = "default_new_node_name")]
    pub new_node_name: String,

    #[serde(default = "default_root_name")]
    pub root_name: String,

    /// Number of spaces per indentation level
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,

    /// Create .bak files before saving
    #[serde(default)]
    pub create_backup: bool,

    #[serde(default = "default_summary_width")]
    pub summary_width: usize,

    #[serde(default)]
    pub draw_key: Option<String>,
}

fn default_undo_limit() -> usize {
    20
}

fn default_new_node_name() -> String {
    "NewNode".to_string()
}

fn default_root_name() -> String {
    "root".to_string()
}

fn default_indent_size() -> usize {
    2
}

fn default_summary_width() -> usize {
    40
}

impl Default for Config {
    fn default() -> Self {
        Self {
            undo_limit: default_undo_limit(),
            new_node_name: default_new_node_name(),
            root_name: default_root_name(),
            indent_size: default_indent_size(),
            create_backup: false,
            summary_width: default_summary_width(),
            draw_key: None,
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/treequill/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("treequill");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        let config_path = match Self::config_path() {
            Some(path) => path,
            None => return Self::default(),
        };

        if !config_path.exists() {
            return Self::default();
        }

        Self::load_from(&config_path).unwrap_or_else(|e| {
            tracing::warn!(path = %config_path.display(), error = %e, "ignoring unreadable config");
            Self::default()
        })
    }

    /// Loads configuration from an explicit path, failing on unreadable or
    /// malformed files.
    pub fn load_from<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Saves configuration to the default config file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&config_path)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }
}
