/*!
 * Result types shared by the aggregation modes and the run report
 */

use std::path::PathBuf;

use crate::tokenizer::Backend;

/// Aggregation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One flattened copy per file
    FanOut,
    /// Single delimited document
    Concatenate,
}

/// A file that made it into the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Source path as listed in the manifest
    pub source: PathBuf,
    /// Flattened name (fan-out) or original path (concatenation)
    pub name: String,
    /// Routed to the visual subdirectory
    pub visual: bool,
    /// Tokens counted for this file
    pub tokens: Option<usize>,
}

/// A file left out because of a per-item failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Source path as listed in the manifest
    pub source: PathBuf,
    /// Why it was skipped
    pub reason: String,
}

/// Token total of a run with an active counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTotal {
    /// Backend that produced the counts
    pub backend: Backend,
    /// Sum of all per-file counts
    pub total: usize,
}

/// Result of fan-out mode
#[derive(Debug, Clone, Default)]
pub struct FanOutOutcome {
    /// Flattened names written to the output root
    pub created: Vec<String>,
    /// Flattened names written to the visual subdirectory
    pub visual: Vec<String>,
    /// Per-file details in manifest order
    pub records: Vec<FileRecord>,
    /// Files skipped after an error
    pub skipped: Vec<SkippedFile>,
    /// Present when counting was active
    pub tokens: Option<TokenTotal>,
}

/// Result of concatenation mode
#[derive(Debug, Clone, Default)]
pub struct ConcatOutcome {
    /// The concatenated document
    pub content: String,
    /// Per-file details in manifest order
    pub records: Vec<FileRecord>,
    /// Files skipped after an error
    pub skipped: Vec<SkippedFile>,
    /// Present when counting was active
    pub tokens: Option<TokenTotal>,
}
