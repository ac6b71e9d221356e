/*!
 * dirflat - Flatten directory trees into LLM-friendly context
 *
 * The pipeline has three stages: a manifest builder that walks a tree through
 * an exact-match ignore engine, a path transformer that turns nested paths
 * into flat `@`-joined names, and an aggregator that either fans files out
 * into one directory or concatenates them into a single document, counting
 * tokens with a pluggable, fault-tolerant backend.
 */

pub mod aggregator;
pub mod config;
pub mod error;
pub mod flatten;
pub mod manifest;
pub mod patterns;
pub mod report;
pub mod scanner;
pub mod tokenizer;
pub mod types;
pub mod utils;


// Re-export main components for easier access
pub use aggregator::Aggregator;
pub use config::{Args, CommandConfig};
pub use error::{DirFlatError, Result};
pub use flatten::{flatten, is_visual_file, JOIN_MARKER};
pub use manifest::{Manifest, ManifestEntry};
pub use patterns::IgnorePatterns;
pub use report::{Reporter, RunReport};
pub use scanner::{ManifestBuilder, ScanOptions};
pub use tokenizer::{Backend, CounterSettings, TokenCounter};
pub use types::{ConcatOutcome, FanOutOutcome, FileRecord, OutputMode, SkippedFile, TokenTotal};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
