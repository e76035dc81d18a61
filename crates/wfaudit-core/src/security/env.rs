use crate::parser::workflow::WorkflowDocument;
use crate::security::scripts::extract_scripts;
use crate::security::{AuditKind, AuditResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// `env.` not preceded by a dot, running up to a closing `}}` on the same line.
const VULNERABLE_ENV: &str = r"[^.]env\..*\}\}";

static VULNERABLE_ENV_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(VULNERABLE_ENV).expect("vulnerable env pattern is valid"));

/// Detect `${{ env.X }}` interpolation inside `run:` scripts.
///
/// Every raw match is reported, duplicates included.
pub fn audit_vulnerable_env(doc: &WorkflowDocument) -> AuditResult {
    let detected: Vec<String> = extract_scripts(doc)
        .flat_map(|script| VULNERABLE_ENV_PATTERN.find_iter(script))
        .map(|m| m.as_str().to_string())
        .collect();

    if detected.is_empty() {
        return AuditResult::pass(AuditKind::VulnerableEnv, "No vulnerable envs detected");
    }

    AuditResult::fail(AuditKind::VulnerableEnv, "Vulnerable envs detected", detected)
}
