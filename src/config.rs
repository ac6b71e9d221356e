/*!
 * Configuration handling for dirflat
 */

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use clap_complete::Shell;

use crate::error::{DirFlatError, Result};
use crate::manifest::Manifest;
use crate::scanner::ScanOptions;
use crate::tokenizer::{Backend, CounterSettings, DEFAULT_REMOTE_MODEL};

/// Command-line arguments for dirflat
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "dirflat",
    version = env!("CARGO_PKG_VERSION"),
    about = "Flatten a directory tree into LLM-friendly files or one document",
    long_about = "Scans a directory into a JSON manifest, then either copies every listed file into one flat directory under an '@'-joined name or concatenates them into a single delimited document, optionally counting tokens."
)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Option<Command>,

    /// Verbose output (-v debug, -vv trace)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scan a directory and emit its manifest as JSON
    Scan {
        /// Directory to scan
        directory: PathBuf,

        /// Write the manifest here instead of stdout
        output_file: Option<PathBuf>,

        /// Ignore-pattern document (.json, .yaml or .yml)
        #[clap(long)]
        ignore_file: Option<PathBuf>,

        /// Sort directory listings by name for deterministic output
        #[clap(long)]
        sorted: bool,
    },

    /// Copy manifest files into one flat directory
    Flatten {
        /// Manifest document produced by `scan`
        manifest: PathBuf,

        /// Output directory
        output_dir: PathBuf,

        /// Remove the output directory before writing
        #[clap(long)]
        clean: bool,

        #[clap(flatten)]
        counting: CountingArgs,
    },

    /// Concatenate manifest files into a single document
    Concat {
        /// Manifest document produced by `scan`
        manifest: PathBuf,

        /// Write the document here instead of stdout
        output_file: Option<PathBuf>,

        #[clap(flatten)]
        counting: CountingArgs,
    },
}

/// Token counting options shared by `flatten` and `concat`
#[derive(ClapArgs, Debug, Clone)]
pub struct CountingArgs {
    /// Count tokens for each file and the whole run
    #[clap(short = 'c', long)]
    pub count_tokens: bool,

    /// Preferred tokenizer; the other one is tried if it cannot be set up
    #[clap(long, value_enum, default_value_t = Backend::Anthropic)]
    pub tokenizer: Backend,

    /// Model name for remote token counting
    #[clap(long, default_value = DEFAULT_REMOTE_MODEL)]
    pub model: String,
}

/// Token counting configuration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CountingConfig {
    /// Whether counting was requested
    pub enabled: bool,
    /// Backend settings used when enabled
    pub settings: CounterSettings,
}

impl CountingConfig {
    /// Create configuration from command-line arguments
    pub fn from_args(args: CountingArgs) -> Self {
        Self {
            enabled: args.count_tokens,
            settings: CounterSettings::from_env(args.tokenizer, args.model),
        }
    }
}

/// Configuration for the `scan` command
#[derive(Clone, Debug)]
pub struct ScanConfig {
    /// Directory to scan
    pub target_dir: PathBuf,
    /// Manifest destination; stdout when absent
    pub output_file: Option<PathBuf>,
    /// Ignore-pattern document
    pub ignore_file: Option<PathBuf>,
    /// Traversal options
    pub options: ScanOptions,
}

/// Configuration for the `flatten` command
#[derive(Clone, Debug)]
pub struct FlattenConfig {
    /// Manifest document
    pub manifest: PathBuf,
    /// Output directory
    pub output_dir: PathBuf,
    /// Remove the output directory first
    pub clean: bool,
    /// Token counting
    pub counting: CountingConfig,
}

/// Configuration for the `concat` command
#[derive(Clone, Debug)]
pub struct ConcatConfig {
    /// Manifest document
    pub manifest: PathBuf,
    /// Document destination; stdout when absent
    pub output_file: Option<PathBuf>,
    /// Token counting
    pub counting: CountingConfig,
}

impl ScanConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.target_dir.is_dir() {
            return Err(DirFlatError::NotADirectory(self.target_dir.clone()));
        }
        check_parent_exists(self.output_file.as_deref())
    }
}

impl FlattenConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        check_manifest_exists(&self.manifest)?;
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(DirFlatError::Config(format!(
                "Output path exists and is not a directory: {}",
                self.output_dir.display()
            )));
        }
        Ok(())
    }

    /// Refuse `--clean` when the output directory holds any scanned directory
    pub fn check_clean_target(&self, manifest: &Manifest) -> Result<()> {
        if !self.clean {
            return Ok(());
        }
        let Ok(output) = std::fs::canonicalize(&self.output_dir) else {
            return Ok(());
        };
        for dir in manifest.directories() {
            let dir = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
            if dir.starts_with(&output) {
                return Err(DirFlatError::Config(format!(
                    "Refusing to clean {}: it contains scanned directory {}",
                    self.output_dir.display(),
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

impl ConcatConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        check_manifest_exists(&self.manifest)?;
        check_parent_exists(self.output_file.as_deref())
    }
}

impl Command {
    /// Build the typed configuration for this command
    pub fn into_config(self) -> CommandConfig {
        match self {
            Command::Scan {
                directory,
                output_file,
                ignore_file,
                sorted,
            } => CommandConfig::Scan(ScanConfig {
                target_dir: directory,
                output_file,
                ignore_file,
                options: ScanOptions { sorted },
            }),
            Command::Flatten {
                manifest,
                output_dir,
                clean,
                counting,
            } => CommandConfig::Flatten(FlattenConfig {
                manifest,
                output_dir,
                clean,
                counting: CountingConfig::from_args(counting),
            }),
            Command::Concat {
                manifest,
                output_file,
                counting,
            } => CommandConfig::Concat(ConcatConfig {
                manifest,
                output_file,
                counting: CountingConfig::from_args(counting),
            }),
        }
    }
}

/// Typed configuration for one invocation
#[derive(Clone, Debug)]
pub enum CommandConfig {
    Scan(ScanConfig),
    Flatten(FlattenConfig),
    Concat(ConcatConfig),
}

fn check_manifest_exists(path: &std::path::Path) -> Result<()> {
    if !path.is_file() {
        return Err(DirFlatError::InvalidManifest(format!(
            "Manifest file not found: {}",
            path.display()
        )));
    }
    Ok(())
}

fn check_parent_exists(output: Option<&std::path::Path>) -> Result<()> {
    if let Some(parent) = output.and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(DirFlatError::Config(format!(
                "Output directory not found: {}",
                parent.display()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flatten_defaults() {
        let args = Args::parse_from(["dirflat", "flatten", "m.json", "out"]);
        let Some(CommandConfig::Flatten(config)) = args.command.map(Command::into_config) else {
            panic!("expected flatten command");
        };
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(!config.clean);
        assert!(!config.counting.enabled);
        assert_eq!(config.counting.settings.preferred, Backend::Anthropic);
        assert_eq!(config.counting.settings.model, DEFAULT_REMOTE_MODEL);
    }

    #[test]
    fn test_parse_concat_counting_options() {
        let args = Args::parse_from([
            "dirflat",
            "-v",
            "concat",
            "m.json",
            "-c",
            "--tokenizer",
            "tiktoken",
            "--model",
            "claude-3-7-sonnet-latest",
        ]);
        assert_eq!(args.verbose, 1);
        let Some(CommandConfig::Concat(config)) = args.command.map(Command::into_config) else {
            panic!("expected concat command");
        };
        assert!(config.output_file.is_none());
        assert!(config.counting.enabled);
        assert_eq!(config.counting.settings.preferred, Backend::Tiktoken);
        assert_eq!(config.counting.settings.model, "claude-3-7-sonnet-latest");
    }

    #[test]
    fn test_parse_scan() {
        let args = Args::parse_from([
            "dirflat",
            "scan",
            "src",
            "manifest.json",
            "--ignore-file",
            "ignore.yaml",
            "--sorted",
        ]);
        let Some(CommandConfig::Scan(config)) = args.command.map(Command::into_config) else {
            panic!("expected scan command");
        };
        assert_eq!(config.ignore_file, Some(PathBuf::from("ignore.yaml")));
        assert!(config.options.sorted);
    }

    #[test]
    fn test_validation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let scan = ScanConfig {
            target_dir: temp_dir.path().join("missing"),
            output_file: None,
            ignore_file: None,
            options: ScanOptions::default(),
        };
        assert!(matches!(scan.validate(), Err(DirFlatError::NotADirectory(_))));

        let concat = ConcatConfig {
            manifest: temp_dir.path().join("missing.json"),
            output_file: None,
            counting: CountingConfig::default(),
        };
        assert!(matches!(concat.validate(), Err(DirFlatError::InvalidManifest(_))));
    }

    #[test]
    fn test_clean_target_must_not_hold_sources() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = std::fs::canonicalize(temp_dir.path()).unwrap();
        let src = root.join("proj").join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::create_dir(root.join("out")).unwrap();

        let mut manifest = Manifest::new();
        manifest.insert(root.join("proj"), Default::default());
        manifest.insert(src.clone(), Default::default());

        let config = |output_dir: PathBuf, clean: bool| FlattenConfig {
            manifest: root.join("m.json"),
            output_dir,
            clean,
            counting: CountingConfig::default(),
        };

        for target in [root.join("proj"), src, root.clone()] {
            assert!(matches!(
                config(target, true).check_clean_target(&manifest),
                Err(DirFlatError::Config(_))
            ));
        }
        assert!(config(root.join("proj"), false)
            .check_clean_target(&manifest)
            .is_ok());
        assert!(config(root.join("out"), true)
            .check_clean_target(&manifest)
            .is_ok());
        assert!(config(root.join("missing"), true)
            .check_clean_target(&manifest)
            .is_ok());
    }
}
