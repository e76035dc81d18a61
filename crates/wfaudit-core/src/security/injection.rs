use crate::parser::workflow::WorkflowDocument;
use crate::security::scripts::extract_scripts;
use crate::security::{AuditKind, AuditResult};
use once_cell::sync::Lazy;
use regex::Regex;

/// GitHub Actions contexts whose values an outside actor can influence.
///
/// Interpolating any of these into a `run:` script lets the actor inject
/// shell. Order here is the order detections are reported in.
pub const RISKY_CONTEXTS: &[&str] = &[
    r"github\.head_ref",
    r"github\.event\.comment\.body",
    r"github\.event\.discussion\.body",
    r"github\.event\.discussion\.title",
    r"github\.event\.head_commit\.author\.email",
    r"github\.event\.head_commit\.author\.name",
    r"github\.event\.head_commit\.committer\.email",
    r"github\.event\.head_commit\.committer\.name",
    r"github\.event\.head_commit\.message",
    r"github\.event\.issue\.body",
    r"github\.event\.issue\.title",
    r"github\.event\.pages\..*\.page_name",
    r"github\.event\.pages\..*\.title",
    r"github\.event\.pull_request\.body",
    r"github\.event\.pull_request\.head\.label",
    r"github\.event\.pull_request\.head\.ref",
    r"github\.event\.pull_request\.head\.repo\.default_branch",
    r"github\.event\.pull_request\.head\.repo\.description",
    r"github\.event\.pull_request\.head\.repo\.homepage",
    r"github\.event\.pull_request\.title",
    r"github\.event\.review\.body",
    r"github\.event\.workflow_run\.display_title",
    r"github\.event\.workflow_run\.head_branch",
    r"github\.event\.workflow_run\.head_commit\.author\.email",
    r"github\.event\.workflow_run\.head_commit\.author\.name",
    r"github\.event\.workflow_run\.head_commit\.committer\.email",
    r"github\.event\.workflow_run\.head_commit\.committer\.name",
    r"github\.event\.workflow_run\.head_commit\.message",
    r"github\.event\.workflow_run\.head_repository\.description",
    r"inputs\..*",
];

struct ContextRule {
    pattern: Regex,
    display: String,
}

static CONTEXT_RULES: Lazy<Vec<ContextRule>> = Lazy::new(|| {
    RISKY_CONTEXTS
        .iter()
        .map(|raw| ContextRule {
            pattern: Regex::new(raw).expect("risky context pattern is valid"),
            display: display_name(raw),
        })
        .collect()
});

/// Human-readable context name: `github\.event\.pages\..*\.title`
/// becomes `github.event.pages.*.title`.
pub fn display_name(pattern: &str) -> String {
    pattern.replace('\\', "").replace("..", ".")
}

/// Detect attacker-controlled contexts used directly in `run:` scripts.
///
/// Each context is reported once no matter how many scripts use it.
pub fn audit_risky_contexts(doc: &WorkflowDocument) -> AuditResult {
    let scripts = extract_scripts(doc);

    let detected: Vec<String> = CONTEXT_RULES
        .iter()
        .filter(|rule| scripts.clone().any(|script| rule.pattern.is_match(script)))
        .map(|rule| rule.display.clone())
        .collect();

    if detected.is_empty() {
        return AuditResult::pass(AuditKind::RiskyContexts, "No risky contexts detected");
    }

    AuditResult::fail(AuditKind::RiskyContexts, "Risky contexts detected", detected)
}
