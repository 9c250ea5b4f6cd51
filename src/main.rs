//! Access-log analytics from the command line.
//!
//! Loads a JSON array of access-log entries, filters bot traffic, and writes
//! an analytics report.

use anyhow::{Context, Result};
use clap::Parser;
use logsift::{report, Analyzer, AnalyzerConfig, LogEntry, ReportFormat};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "logsift")]
#[command(author, version, about = "Reconstructs web analytics from access logs after filtering bot traffic")]
struct Args {
    /// Path to a JSON array of access-log entries
    input: PathBuf,

    /// Path to configuration file (JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report output path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    format: ReportFormat,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(json: bool, level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, &args.log_level);

    // Load configuration
    let config = if let Some(config_path) = &args.config {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config {}", config_path.display()))?;
        if config_path.extension().is_some_and(|e| e == "yaml" || e == "yml") {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        }
    } else {
        AnalyzerConfig::default()
    };

    // Load log entries
    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read log file {}", args.input.display()))?;
    let entries: Vec<LogEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("malformed log file {}", args.input.display()))?;

    info!(
        input = %args.input.display(),
        entries = entries.len(),
        "loaded access log"
    );

    // Run the pipeline, reusing one partition for both reports
    let analyzer = Analyzer::with_config(config);
    let partitioned = analyzer.partition(&entries);
    let result = analyzer.process_partition(&partitioned);

    let rendered = report::render(&result, &partitioned.stats, args.format)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write report {}", path.display()))?;
            info!(output = %path.display(), "report written");
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
