/*!
 * Aggregation of manifest files into the output artifact
 *
 * Fan-out mode copies every file verbatim under its flattened name;
 * concatenation mode wraps every file's text in path-bearing delimiters and
 * joins them into one document. Both walk the manifest in order, count tokens
 * when a counter is active, and skip (with a warning) any file that fails.
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::error::{DirFlatError, Result, ResultExt};
use crate::flatten::{flatten, is_visual_file, VISUAL_DIR};
use crate::manifest::Manifest;
use crate::tokenizer::{TokenCounter, TOKEN_ADVISORY_THRESHOLD};
use crate::types::{ConcatOutcome, FanOutOutcome, FileRecord, SkippedFile, TokenTotal};
use crate::utils::format_thousands;

/// Header line that opens a file's section in a concatenated document
pub fn file_header(path: &str) -> String {
    format!("\n--- {} START ---\n", path)
}

/// Footer line that closes a file's section in a concatenated document
pub fn file_footer(path: &str) -> String {
    format!("\n--- {} END ---\n", path)
}

/// Wrap one file's content in its header and footer
pub fn wrap_file(path: &str, content: &str) -> String {
    format!(
        "{}\n{}\n{}\n",
        file_header(path),
        content,
        file_footer(path)
    )
}

/// Drives both aggregation modes with one token counter
pub struct Aggregator {
    counter: TokenCounter,
    progress: Arc<ProgressBar>,
}

impl Aggregator {
    /// Create a new aggregator
    pub fn new(counter: TokenCounter, progress: Arc<ProgressBar>) -> Self {
        Self { counter, progress }
    }

    /// Copy every manifest file into `output_dir` under its flattened name
    ///
    /// Visual files go to a `visual` subdirectory created on first use. A
    /// flattened name seen twice is overwritten by the later file. If a
    /// root-level file named `visual` was written first, the subdirectory
    /// cannot be created and every visual file is skipped with a warning.
    pub fn fan_out(&self, manifest: &Manifest, output_dir: &Path) -> Result<FanOutOutcome> {
        let root = manifest_root(manifest)?;
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Cannot create output directory {}", output_dir.display()))?;

        let mut outcome = FanOutOutcome::default();
        let mut total = 0usize;
        let mut visual_dir: Option<PathBuf> = None;

        for file in manifest.files() {
            self.tick(&file.path);
            let flat_name = flatten(root, &file.path);
            let visual = is_visual_file(&flat_name);
            info!("Processing: {} -> {}", file.path.display(), flat_name);

            let target_dir = if visual {
                match ensure_visual_dir(&mut visual_dir, output_dir) {
                    Ok(dir) => dir,
                    Err(e) => {
                        skip(&mut outcome.skipped, &file.path, e.to_string());
                        continue;
                    }
                }
            } else {
                output_dir.to_path_buf()
            };

            let bytes = match fs::read(&file.path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    skip(&mut outcome.skipped, &file.path, e.to_string());
                    continue;
                }
            };

            if let Err(e) = fs::write(target_dir.join(&flat_name), &bytes) {
                skip(&mut outcome.skipped, &file.path, e.to_string());
                continue;
            }

            let tokens = if visual {
                None
            } else {
                self.count_bytes(&bytes)
            };
            total += tokens.unwrap_or(0);

            if visual {
                outcome.visual.push(flat_name.clone());
            } else {
                outcome.created.push(flat_name.clone());
            }
            outcome.records.push(FileRecord {
                source: file.path.clone(),
                name: flat_name,
                visual,
                tokens,
            });
        }

        outcome.tokens = self.finish(total);
        Ok(outcome)
    }

    /// Concatenate every manifest file's text into one document
    ///
    /// Files that cannot be read as UTF-8 text are skipped. Counting applies
    /// to the wrapped section, delimiters included.
    pub fn concatenate(&self, manifest: &Manifest) -> Result<ConcatOutcome> {
        manifest_root(manifest)?;

        let mut outcome = ConcatOutcome::default();
        let mut total = 0usize;

        for file in manifest.files() {
            self.tick(&file.path);
            let display_path = file.path.display().to_string();
            info!("Processing: {}", display_path);

            let content = match fs::read_to_string(&file.path) {
                Ok(content) => content,
                Err(e) => {
                    skip(&mut outcome.skipped, &file.path, e.to_string());
                    continue;
                }
            };

            let section = wrap_file(&display_path, &content);
            let tokens = self.count_text(&section);
            total += tokens.unwrap_or(0);
            outcome.content.push_str(&section);

            outcome.records.push(FileRecord {
                source: file.path.clone(),
                name: display_path,
                visual: false,
                tokens,
            });
        }

        outcome.tokens = self.finish(total);
        Ok(outcome)
    }

    /// Clear the progress bar once output is complete
    pub fn finish_progress(&self) {
        self.progress.finish_and_clear();
    }

    fn tick(&self, path: &Path) {
        self.progress.inc(1);
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        self.progress.set_message(format!("Current file: {}", file_name));
    }

    /// Count raw bytes if they decode as UTF-8
    fn count_bytes(&self, bytes: &[u8]) -> Option<usize> {
        if !self.counter.is_active() {
            return None;
        }
        match std::str::from_utf8(bytes) {
            Ok(text) => self.count_text(text),
            Err(_) => {
                debug!("File appears to be binary. Skipping token count.");
                None
            }
        }
    }

    fn count_text(&self, text: &str) -> Option<usize> {
        let tokens = self.counter.count(text)?;
        info!("Tokens: {}", format_thousands(tokens));
        Some(tokens)
    }

    /// Report the run total and build the outcome's token summary
    fn finish(&self, total: usize) -> Option<TokenTotal> {
        let backend = self.counter.backend()?;
        info!(
            "Total tokens processed ({}): {}",
            backend.label(),
            format_thousands(total)
        );
        if total > TOKEN_ADVISORY_THRESHOLD {
            warn!(
                "Total tokens exceed {}. This may be too large for some models.",
                format_thousands(TOKEN_ADVISORY_THRESHOLD)
            );
        }
        Some(TokenTotal { backend, total })
    }
}

fn manifest_root(manifest: &Manifest) -> Result<&Path> {
    manifest
        .root()
        .ok_or_else(|| DirFlatError::InvalidManifest("manifest lists no directories".to_string()))
}

fn ensure_visual_dir(visual_dir: &mut Option<PathBuf>, output_dir: &Path) -> std::io::Result<PathBuf> {
    if let Some(dir) = visual_dir {
        return Ok(dir.clone());
    }
    let dir = output_dir.join(VISUAL_DIR);
    fs::create_dir_all(&dir)?;
    *visual_dir = Some(dir.clone());
    Ok(dir)
}

fn skip(skipped: &mut Vec<SkippedFile>, path: &Path, reason: String) {
    warn!("Error processing {}: {}. Skipping file.", path.display(), reason);
    skipped.push(SkippedFile {
        source: path.to_path_buf(),
        reason,
    });
}
