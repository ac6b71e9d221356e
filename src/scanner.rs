/*!
 * Directory scanning into a manifest
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{DirFlatError, Result};
use crate::manifest::{Manifest, ManifestEntry};
use crate::patterns::IgnorePatterns;

/// Options controlling traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Sort each directory listing by name instead of platform order
    pub sorted: bool,
}

/// Filtered listing of one directory
#[derive(Debug, Default)]
struct Listing {
    dirs: Vec<String>,
    files: Vec<String>,
    /// Subdirectories that are symlinks; listed but not descended into
    linked: Vec<String>,
}

/// Walks a directory tree and records what the ignore patterns keep
pub struct ManifestBuilder {
    /// Patterns applied to every entry name
    patterns: IgnorePatterns,
    /// Traversal options
    options: ScanOptions,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
}

impl ManifestBuilder {
    /// Create a new builder
    pub fn new(patterns: IgnorePatterns, progress: Arc<ProgressBar>) -> Self {
        Self {
            patterns,
            options: ScanOptions::default(),
            progress,
        }
    }

    /// Replace the traversal options
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Scan `root` and return its manifest
    ///
    /// Fails only when `root` is not a readable directory. Unreadable
    /// subdirectories are logged and left out.
    pub fn build(&self, root: &Path) -> Result<Manifest> {
        let abs_root =
            fs::canonicalize(root).map_err(|_| DirFlatError::NotADirectory(root.to_path_buf()))?;
        if !abs_root.is_dir() {
            return Err(DirFlatError::NotADirectory(root.to_path_buf()));
        }

        let mut manifest = Manifest::new();
        let listing = self.list_directory(&abs_root)?;
        self.record(&abs_root, listing, &mut manifest);

        Ok(manifest)
    }

    /// Record a directory's listing, then descend into its kept subdirectories
    fn record(&self, dir: &Path, listing: Listing, manifest: &mut Manifest) {
        let children: Vec<PathBuf> = listing
            .dirs
            .iter()
            .filter(|name| !listing.linked.contains(name))
            .map(|name| dir.join(name))
            .collect();

        manifest.insert(
            dir.to_path_buf(),
            ManifestEntry {
                dirs: listing.dirs,
                files: listing.files,
            },
        );

        for child in children {
            match self.list_directory(&child) {
                Ok(listing) => self.record(&child, listing, manifest),
                Err(e) => warn!("Error processing directory {}: {}", child.display(), e),
            }
        }
    }

    /// List one directory, dropping ignored names
    fn list_directory(&self, dir: &Path) -> Result<Listing> {
        info!("Processing directory: {}", dir.display());
        self.progress.inc(1);
        self.progress
            .set_message(format!("Scanning: {}", dir.display()));

        let mut walker = WalkDir::new(dir).min_depth(1).max_depth(1);
        if self.options.sorted {
            walker = walker.sort_by_file_name();
        }

        let mut listing = Listing::default();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(io::Error::from(e).into()),
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if self.patterns.should_ignore(&name) {
                continue;
            }

            if entry.path().is_dir() {
                if entry.path_is_symlink() {
                    listing.linked.push(name.clone());
                }
                listing.dirs.push(name);
            } else {
                listing.files.push(name);
            }
        }

        Ok(listing)
    }
}
