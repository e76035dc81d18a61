use colored::*;
use wfaudit_core::report::{AuditOutcome, FileReport, RunSummary};
use wfaudit_core::security::AuditResult;
use wfaudit_core::LoadError;

/// Print the per-file separator line.
pub fn print_file_banner(path: &str) {
    println!();
    println!(
        "{}",
        format!("/-------------------{}-------------------/", path).bold()
    );
    println!();
}

/// Print every audit outcome of a file: its title, then one result line.
pub fn print_file_report(report: &FileReport) {
    for outcome in &report.outcomes {
        println!("{}", outcome.audit().title());
        match outcome {
            AuditOutcome::Ran(result) => print_result(result),
            AuditOutcome::Skipped { reason, .. } => {
                println!(" {} {}", "[ SKIPPED ]".yellow(), reason);
            }
        }
    }
}

fn print_result(result: &AuditResult) {
    let marker = if result.passed {
        result.marker().green()
    } else {
        result.marker().red()
    };
    println!(" {} {}", marker, result.detail);
}

pub fn print_load_error(path: &str, error: &LoadError) {
    println!(
        " {} {} could not be audited: {}",
        "[ SKIPPED ]".yellow(),
        path,
        error
    );
}

/// Print the failed-file list, if any.
pub fn print_summary(summary: &RunSummary) {
    if summary.passed() {
        println!();
        println!(
            " {} {} workflow(s) audited, no issues found",
            "OK".green().bold(),
            summary.audited
        );
        return;
    }

    println!();
    println!("The following workflows have failed the audit:");
    for failed in &summary.failed_files {
        println!("    {}", failed.red());
    }
}
