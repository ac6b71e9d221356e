/*!
 * Ignore-pattern engine
 *
 * Exact-name matching against file names, folder names and extensions, plus an
 * optional hidden-entry rule. Pattern documents are JSON or YAML; a document
 * that cannot be used degrades to the empty pattern set so scanning proceeds.
 */

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{DirFlatError, Result};

/// Leading character that marks a hidden entry
pub const HIDDEN_MARKER: char = '.';

/// Set of names and extensions excluded from a scan
///
/// The default value ignores nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IgnorePatterns {
    /// Exact file names
    pub files: HashSet<String>,
    /// Exact folder names
    pub folders: HashSet<String>,
    /// Extensions, each including the leading dot
    pub extensions: HashSet<String>,
    /// Ignore entries whose name starts with `.`
    #[serde(default)]
    pub ignore_hidden: bool,
}

/// Serialization format of an ignore-pattern document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternFormat {
    Json,
    Yaml,
}

impl PatternFormat {
    /// Detect the format from the file extension; anything unknown is read as JSON
    pub fn detect(path: &Path) -> Self {
        match path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => PatternFormat::Yaml,
            _ => PatternFormat::Json,
        }
    }
}

impl IgnorePatterns {
    /// Decide whether a directory entry name is excluded
    ///
    /// Used for both folder names (to prune recursion) and file names (to
    /// filter listings).
    pub fn should_ignore(&self, name: &str) -> bool {
        if let Some(ext) = extension_of(name) {
            if self.extensions.contains(ext) {
                return true;
            }
        }
        if self.files.contains(name) || self.folders.contains(name) {
            return true;
        }
        self.ignore_hidden && name.starts_with(HIDDEN_MARKER)
    }

    /// Parse a pattern document in the given format
    pub fn parse(content: &str, format: PatternFormat) -> Result<Self> {
        match format {
            PatternFormat::Json => {
                let value: serde_json::Value = serde_json::from_str(content)?;
                if !value.is_object() {
                    return Err(DirFlatError::InvalidPatterns(
                        "top-level value must be a mapping".to_string(),
                    ));
                }
                Ok(serde_json::from_value(value)?)
            }
            PatternFormat::Yaml => {
                let value: serde_yaml::Value = serde_yaml::from_str(content)?;
                if !value.is_mapping() {
                    return Err(DirFlatError::InvalidPatterns(
                        "top-level value must be a mapping".to_string(),
                    ));
                }
                Ok(serde_yaml::from_value(value)?)
            }
        }
    }

    /// Load a pattern document, reporting any failure
    pub fn try_load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, PatternFormat::detect(path))
    }

    /// Load a pattern document, substituting the empty set on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(patterns) => {
                info!("Loaded ignore patterns from {}", path.display());
                patterns
            }
            Err(e) => {
                warn!(
                    "Ignore patterns file '{}' could not be used ({}). Using empty patterns.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

/// Extension of a file name including its leading dot
///
/// Leading dots are not extension separators, so `.bashrc` has none and
/// `archive.tar.gz` yields `.gz`.
pub fn extension_of(name: &str) -> Option<&str> {
    let trimmed = name.trim_start_matches(HIDDEN_MARKER);
    let offset = name.len() - trimmed.len();
    trimmed.rfind('.').map(|idx| &name[offset + idx..])
}
