mod display;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use wfaudit_core::config::resolve_config;
use wfaudit_core::report::{FileReport, RunSummary};
use wfaudit_core::{security, WorkflowLoader};

#[derive(Parser)]
#[command(
    name = "wfaudit",
    version,
    about = "wfaudit: static security audit for GitHub Actions workflows",
    long_about = "Audit GitHub Actions workflows for CI/CD injection risks: self-hosted runners in public repos, \
                  risky triggers with untrusted checkouts, injectable contexts and env interpolation in scripts, \
                  and privileged jobs that skip user verification."
)]
struct Cli {
    /// Comma-separated workflow paths, relative to the repository root
    #[arg(
        short,
        long,
        env = "INPUT_MODIFIED_WORKFLOWS",
        value_delimiter = ','
    )]
    workflows: Vec<String>,

    /// Audit every workflow in the trusted workflow directory
    #[arg(long, conflicts_with = "workflows")]
    all: bool,

    /// Whether the repository is public (enables runner and verify-user audits)
    #[arg(
        long,
        env = "INPUT_IS_PUBLIC",
        default_value = "false",
        value_parser = parse_bool_flag,
        action = ArgAction::Set
    )]
    is_public: bool,

    /// Repository root
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to .wfaudit.toml in the repository root)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Accepts the `True`/`False` spelling GitHub passes to action inputs.
fn parse_bool_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(format!("expected true or false, got '{}'", other)),
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let summary = cmd_audit(&cli)?;
    Ok(ExitCode::from(summary.exit_code()))
}

fn cmd_audit(cli: &Cli) -> Result<RunSummary> {
    let config = resolve_config(&cli.root, cli.config.as_deref())
        .context("Failed to load audit configuration")?;
    let options = config.audit_options(cli.is_public);
    let loader = WorkflowLoader::with_trusted_dir(&cli.root, &config.trusted_dir);

    let paths: Vec<String> = if cli.all {
        loader.discover()
    } else {
        cli.workflows
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    };

    if paths.is_empty() {
        if cli.all {
            anyhow::bail!(
                "No workflow files found under '{}'.",
                loader.trusted_dir()
            );
        }
        // A change set that touches no workflow has nothing to fail
        tracing::info!("no workflow files to audit");
    }

    tracing::info!(files = paths.len(), is_public = cli.is_public, "starting audit");

    let mut summary = RunSummary::default();
    let mut reports: Vec<FileReport> = Vec::new();

    for path in &paths {
        if cli.format == OutputFormat::Text {
            display::print_file_banner(path);
        }

        let doc = match loader.load(path) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "skipping workflow");
                if cli.format == OutputFormat::Text {
                    display::print_load_error(path, &e);
                }
                summary.record_skipped(path.as_str(), e.to_string());
                continue;
            }
        };

        let report = security::scan(&doc, &options);
        summary.record(&report);

        match cli.format {
            OutputFormat::Text => display::print_file_report(&report),
            OutputFormat::Json => reports.push(report),
        }
    }

    match cli.format {
        OutputFormat::Text => display::print_summary(&summary),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "files": reports,
                "summary": summary,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(summary)
}
