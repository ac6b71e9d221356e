/*!
 * Reporting functionality for dirflat
 *
 * Renders a run summary with the tabled library once aggregation finishes.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::types::{ConcatOutcome, FanOutOutcome, FileRecord, OutputMode, SkippedFile, TokenTotal};
use crate::utils::format_thousands;

/// Largest number of file rows printed before truncating
const MAX_FILE_ROWS: usize = 15;

/// Summary of one aggregation run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Which mode produced the output
    pub mode: OutputMode,
    /// Output directory, file, or `<stdout>`
    pub output: String,
    /// Time taken to aggregate
    pub duration: Duration,
    /// Per-file details in manifest order
    pub files: Vec<FileRecord>,
    /// Files skipped after an error
    pub skipped: Vec<SkippedFile>,
    /// Present when counting was active
    pub tokens: Option<TokenTotal>,
}

impl RunReport {
    /// Report for a fan-out run
    pub fn from_fan_out(outcome: &FanOutOutcome, output: String, duration: Duration) -> Self {
        Self {
            mode: OutputMode::FanOut,
            output,
            duration,
            files: outcome.records.clone(),
            skipped: outcome.skipped.clone(),
            tokens: outcome.tokens,
        }
    }

    /// Report for a concatenation run
    pub fn from_concat(outcome: &ConcatOutcome, output: String, duration: Duration) -> Self {
        Self {
            mode: OutputMode::Concatenate,
            output,
            duration,
            files: outcome.records.clone(),
            skipped: outcome.skipped.clone(),
            tokens: outcome.tokens,
        }
    }

    /// Number of files routed to the visual subdirectory
    pub fn visual_count(&self) -> usize {
        self.files.iter().filter(|f| f.visual).count()
    }
}

/// Report generator for aggregation results
#[derive(Debug, Default)]
pub struct Reporter;

impl Reporter {
    /// Create a new reporter
    pub fn new() -> Self {
        Self
    }

    /// Generate the report text
    pub fn generate_report(&self, report: &RunReport) -> String {
        let files_title = if report.files.len() > MAX_FILE_ROWS {
            format!("📋  FIRST {} OF {} FILES", MAX_FILE_ROWS, report.files.len())
        } else {
            "📋  PROCESSED FILES".to_string()
        };

        let mut sections = vec![
            format!("{}\n{}", files_title, self.create_files_table(report)),
            format!("✅  RUN COMPLETE\n{}", self.create_summary_table(report)),
        ];
        if !report.skipped.is_empty() {
            sections.push(format!(
                "⚠️  SKIPPED FILES\n{}",
                self.create_skipped_table(report)
            ));
        }

        sections.join("\n\n")
    }

    /// Print the report to stderr, keeping stdout for document output
    pub fn print_report(&self, report: &RunReport) {
        eprintln!("\n{}", self.generate_report(report));
    }

    fn create_summary_table(&self, report: &RunReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mode = match report.mode {
            OutputMode::FanOut => "fan-out",
            OutputMode::Concatenate => "concatenate",
        };

        let mut rows = vec![
            SummaryRow {
                key: "🔀 Mode".to_string(),
                value: mode.to_string(),
            },
            SummaryRow {
                key: "📂 Output".to_string(),
                value: report.output.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "📄 Files Written".to_string(),
                value: format_thousands(report.files.len()),
            },
        ];

        if report.mode == OutputMode::FanOut {
            rows.push(SummaryRow {
                key: "🖼️ Visual Files".to_string(),
                value: format_thousands(report.visual_count()),
            });
        }

        rows.push(SummaryRow {
            key: "⏭️ Skipped".to_string(),
            value: format_thousands(report.skipped.len()),
        });

        rows.push(SummaryRow {
            key: "📦 LLM Tokens".to_string(),
            value: match report.tokens {
                Some(tokens) => format!(
                    "{} ({})",
                    format_thousands(tokens.total),
                    tokens.backend.label()
                ),
                None => "not counted".to_string(),
            },
        });

        styled(Table::new(rows))
    }

    fn create_files_table(&self, report: &RunReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "Output")]
            name: String,

            #[tabled(rename = "Tokens")]
            tokens: String,
        }

        let rows: Vec<FileRow> = report
            .files
            .iter()
            .take(MAX_FILE_ROWS)
            .map(|file| FileRow {
                name: if file.visual {
                    format!("visual/{}", file.name)
                } else {
                    file.name.clone()
                },
                tokens: file
                    .tokens
                    .map(format_thousands)
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect();

        styled(Table::new(rows))
    }

    fn create_skipped_table(&self, report: &RunReport) -> String {
        #[derive(Tabled)]
        struct SkippedRow {
            #[tabled(rename = "File")]
            path: String,

            #[tabled(rename = "Reason")]
            reason: String,
        }

        let rows: Vec<SkippedRow> = report
            .skipped
            .iter()
            .map(|s| SkippedRow {
                path: s.source.display().to_string(),
                reason: s.reason.clone(),
            })
            .collect();

        styled(Table::new(rows))
    }
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Padding::new(1, 1, 0, 0))
        .with(Modify::new(Columns::new(..)).with(Alignment::left()));
    table.to_string()
}
