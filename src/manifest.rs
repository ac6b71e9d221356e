/*!
 * Manifest data model and document I/O
 *
 * A manifest maps each scanned directory (absolute path) to the names of the
 * subdirectories and files it kept. Key order is traversal order and is
 * preserved through save and load.
 */

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{DirFlatError, Result};
use crate::{bail, ensure};

/// Listing recorded for one directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Retained subdirectory names
    pub dirs: Vec<String>,
    /// Retained file names
    pub files: Vec<String>,
}

/// Directory path to listing, in traversal order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: IndexMap<PathBuf, ManifestEntry>,
}

/// One file reference resolved from a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile<'a> {
    /// Directory that lists the file
    pub dir: &'a Path,
    /// Name as listed
    pub name: &'a str,
    /// `dir` joined with `name`
    pub path: PathBuf,
}

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the listing for a directory
    pub fn insert(&mut self, dir: PathBuf, entry: ManifestEntry) {
        self.entries.insert(dir, entry);
    }

    /// Listing for a directory, if it was visited
    pub fn get(&self, dir: &Path) -> Option<&ManifestEntry> {
        self.entries.get(dir)
    }

    /// First recorded directory, which is the scan root
    pub fn root(&self) -> Option<&Path> {
        self.entries.keys().next().map(PathBuf::as_path)
    }

    /// Visited directories in traversal order
    pub fn directories(&self) -> impl Iterator<Item = &Path> {
        self.entries.keys().map(PathBuf::as_path)
    }

    /// Directory listings in traversal order
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &ManifestEntry)> {
        self.entries.iter().map(|(dir, entry)| (dir.as_path(), entry))
    }

    /// Every listed file in manifest order
    pub fn files(&self) -> impl Iterator<Item = ManifestFile<'_>> {
        self.iter().flat_map(|(dir, entry)| {
            entry.files.iter().map(move |name| ManifestFile {
                dir,
                name: name.as_str(),
                path: dir.join(name),
            })
        })
    }

    /// Number of directories recorded
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no directory was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse and validate a manifest document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| DirFlatError::InvalidManifest(format!("not valid JSON: {}", e)))?;

        let Some(object) = value.as_object() else {
            bail!(InvalidManifest, "expected a mapping of directory paths");
        };

        let mut manifest = Manifest::new();
        for (dir, listing) in object {
            ensure!(
                listing.is_object(),
                InvalidManifest,
                "invalid entry for directory: {}",
                dir
            );
            ensure!(
                listing.get("dirs").is_some() && listing.get("files").is_some(),
                InvalidManifest,
                "missing 'dirs' or 'files' keys in directory: {}",
                dir
            );
            let entry: ManifestEntry = serde_json::from_value(listing.clone()).map_err(|e| {
                DirFlatError::InvalidManifest(format!("invalid entry for directory {}: {}", dir, e))
            })?;
            manifest.insert(PathBuf::from(dir), entry);
        }

        manifest.validate()?;
        Ok(manifest)
    }

    /// Load and validate a manifest document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DirFlatError::InvalidManifest(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Check that the manifest is usable on the current filesystem
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.is_empty(), InvalidManifest, "manifest lists no directories");
        for dir in self.directories() {
            if !dir.is_dir() {
                return Err(DirFlatError::NotADirectory(dir.to_path_buf()));
            }
        }
        Ok(())
    }

    /// Render as a pretty-printed JSON document
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write as a pretty-printed JSON document
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip_preserves_order() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().to_path_buf();
        let zeta = root.join("zeta");
        let alpha = root.join("alpha");
        fs::create_dir(&zeta).unwrap();
        fs::create_dir(&alpha).unwrap();

        let mut manifest = Manifest::new();
        manifest.insert(
            root.clone(),
            ManifestEntry {
                dirs: vec!["zeta".into(), "alpha".into()],
                files: vec!["b.txt".into(), "a.txt".into()],
            },
        );
        manifest.insert(zeta.clone(), ManifestEntry::default());
        manifest.insert(alpha.clone(), ManifestEntry::default());

        let json = manifest.to_json_pretty().unwrap();
        let loaded = Manifest::from_json_str(&json).unwrap();

        assert_eq!(loaded, manifest);
        assert_eq!(loaded.root(), Some(root.as_path()));
        let order: Vec<&Path> = loaded.directories().collect();
        assert_eq!(order, vec![root.as_path(), zeta.as_path(), alpha.as_path()]);
    }

    #[test]
    fn test_files_in_manifest_order() {
        let mut manifest = Manifest::new();
        manifest.insert(
            PathBuf::from("/proj"),
            ManifestEntry {
                dirs: vec!["sub".into()],
                files: vec!["a.txt".into()],
            },
        );
        manifest.insert(
            PathBuf::from("/proj/sub"),
            ManifestEntry {
                dirs: vec![],
                files: vec!["b.txt".into(), "c.txt".into()],
            },
        );

        let paths: Vec<PathBuf> = manifest.files().map(|f| f.path).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/proj/a.txt"),
                PathBuf::from("/proj/sub/b.txt"),
                PathBuf::from("/proj/sub/c.txt"),
            ]
        );
    }

    #[test]
    fn test_rejects_malformed_documents() {
        let temp_dir = tempdir().unwrap();
        let dir = serde_json::to_string(&temp_dir.path().to_string_lossy()).unwrap();

        let cases = vec![
            "[]".to_string(),
            "{}".to_string(),
            "not json".to_string(),
            format!("{{{}: []}}", dir),
            format!("{{{}: {{\"dirs\": []}}}}", dir),
            format!("{{{}: {{\"dirs\": [], \"files\": \"a\"}}}}", dir),
            format!("{{{}: {{\"dirs\": [1], \"files\": []}}}}", dir),
        ];
        for case in cases {
            let err = Manifest::from_json_str(&case).unwrap_err();
            assert!(
                matches!(err, DirFlatError::InvalidManifest(_)),
                "unexpected error for {case}: {err}"
            );
        }
    }

    #[test]
    fn test_rejects_missing_directory() {
        let temp_dir = tempdir().unwrap();
        let gone = temp_dir.path().join("gone");
        let key = serde_json::to_string(&gone.to_string_lossy()).unwrap();
        let doc = format!("{{{}: {{\"dirs\": [], \"files\": []}}}}", key);

        let err = Manifest::from_json_str(&doc).unwrap_err();
        assert!(matches!(err, DirFlatError::NotADirectory(path) if path == gone));
    }

    #[test]
    fn test_load_missing_file_is_invalid_manifest() {
        let temp_dir = tempdir().unwrap();
        let err = Manifest::load(&temp_dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, DirFlatError::InvalidManifest(_)));
    }
}
