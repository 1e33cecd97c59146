use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use content_export::{render_summary, ExportLayout, ExtractionReport, Extractor};
use std::path::PathBuf;
use std::process::ExitCode;

/// Extract post statistics from a LinkedIn content export workbook
#[derive(Parser, Debug)]
#[command(name = "content-export", version, about)]
struct Cli {
    /// Path to the exported .xlsx workbook
    file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Substring every accepted post URL must contain
    #[arg(long, default_value = "linkedin.com")]
    host: String,

    /// Rows kept per ranked post table
    #[arg(long, default_value_t = 10)]
    top_posts: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// JSON report, `{"error": ...}` on failure
    Json,
    /// Plain-text summary
    Text,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let bytes = std::fs::read(&cli.file).with_context(|| format!("Failed to read {:?}", cli.file))?;
    let extractor = Extractor::new(ExportLayout {
        host: cli.host,
        top_posts: cli.top_posts,
        ..ExportLayout::default()
    });
    let report = ExtractionReport::from(extractor.extract(&bytes));

    match (&report, cli.format) {
        (ExtractionReport::Extracted(data), Format::Text) => print!("{}", render_summary(data)),
        (ExtractionReport::Failed { error }, Format::Text) => eprintln!("Error: {error}"),
        (_, Format::Json) => println!("{}", report.to_json().context("Failed to serialise report")?),
    }
    Ok(if report.is_failed() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
