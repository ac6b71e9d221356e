/*!
 * Command-line interface for dirflat
 */

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dirflat::aggregator::Aggregator;
use dirflat::config::{Args, CommandConfig, ConcatConfig, CountingConfig, FlattenConfig, ScanConfig};
use dirflat::error::{Result, ResultExt};
use dirflat::manifest::Manifest;
use dirflat::patterns::IgnorePatterns;
use dirflat::report::{Reporter, RunReport};
use dirflat::scanner::ManifestBuilder;
use dirflat::tokenizer::TokenCounter;
use dirflat::utils::count_files;

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    setup_tracing(args.verbose);

    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "dirflat", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    let Some(command) = args.command else {
        let _ = Args::command().print_help();
        return ExitCode::FAILURE;
    };

    let result = match command.into_config() {
        CommandConfig::Scan(config) => run_scan(config),
        CommandConfig::Flatten(config) => run_flatten(config),
        CommandConfig::Concat(config) => run_concat(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn setup_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::new("dirflat=info"),
        1 => EnvFilter::new("dirflat=debug"),
        _ => EnvFilter::new("dirflat=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_ansi(io::stderr().is_terminal())
                .with_writer(io::stderr),
        )
        .init();
}

/// Spinner shared by the scan and aggregation stages
fn create_progress(prefix: &'static str, length: u64) -> ProgressBar {
    let progress = ProgressBar::new(length);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ⏱️  {elapsed_precise}")
    {
        progress.set_style(style);
    }
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress.set_prefix(prefix);
    progress
}

fn run_scan(config: ScanConfig) -> Result<()> {
    config.validate()?;

    let patterns = match &config.ignore_file {
        Some(path) => IgnorePatterns::load_or_default(path),
        None => IgnorePatterns::default(),
    };

    let progress = create_progress("📂 Scanning", 0);
    let builder =
        ManifestBuilder::new(patterns, Arc::new(progress.clone())).with_options(config.options);
    let manifest = builder.build(&config.target_dir)?;
    progress.finish_and_clear();

    match &config.output_file {
        Some(path) => {
            manifest.save(path)?;
            info!(
                "Wrote manifest of {} directories to {}",
                manifest.len(),
                path.display()
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", manifest.to_json_pretty()?)?;
        }
    }

    Ok(())
}

fn run_flatten(config: FlattenConfig) -> Result<()> {
    config.validate()?;

    let manifest = Manifest::load(&config.manifest)?;
    info!("Manifest is valid. Processing files...");

    config.check_clean_target(&manifest)?;
    if config.clean && config.output_dir.exists() {
        fs::remove_dir_all(&config.output_dir).with_context(|| {
            format!("Error removing directory {}", config.output_dir.display())
        })?;
    }

    let aggregator = create_aggregator(&config.counting, &manifest);
    let start_time = Instant::now();
    let outcome = aggregator.fan_out(&manifest, &config.output_dir)?;
    aggregator.finish_progress();

    let report = RunReport::from_fan_out(
        &outcome,
        config.output_dir.display().to_string(),
        start_time.elapsed(),
    );
    Reporter::new().print_report(&report);

    Ok(())
}

fn run_concat(config: ConcatConfig) -> Result<()> {
    config.validate()?;

    let manifest = Manifest::load(&config.manifest)?;
    info!("Manifest is valid. Concatenating...");

    let aggregator = create_aggregator(&config.counting, &manifest);
    let start_time = Instant::now();
    let outcome = aggregator.concatenate(&manifest)?;
    aggregator.finish_progress();

    let output = match &config.output_file {
        Some(path) => {
            write_document(path, &outcome.content)?;
            info!("Successfully wrote to {}", path.display());
            path.display().to_string()
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(outcome.content.as_bytes())?;
            stdout.flush()?;
            "<stdout>".to_string()
        }
    };

    let report = RunReport::from_concat(&outcome, output, start_time.elapsed());
    Reporter::new().print_report(&report);

    Ok(())
}

fn create_aggregator(counting: &CountingConfig, manifest: &Manifest) -> Aggregator {
    let counter = if counting.enabled {
        TokenCounter::initialize(&counting.settings)
    } else {
        TokenCounter::disabled()
    };

    let progress = create_progress("📊 Processing", count_files(manifest));
    Aggregator::new(counter, Arc::new(progress))
}

fn write_document(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .with_context(|| format!("Cannot write output file {}", path.display()))
}
