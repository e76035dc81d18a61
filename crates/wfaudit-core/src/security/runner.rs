use crate::parser::workflow::WorkflowDocument;
use crate::security::{AuditKind, AuditResult};

const SELF_HOSTED_LABEL: &str = "self-hosted";

/// Flag jobs that run on a self-hosted runner.
///
/// Self-hosted runners persist between runs, so any job a stranger can
/// trigger in a public repository can compromise them. Only run this for
/// public repositories.
pub fn audit_self_hosted_runner(doc: &WorkflowDocument) -> AuditResult {
    let self_hosted_jobs: Vec<String> = doc
        .jobs
        .iter()
        .filter(|job| job.runs_on.contains(SELF_HOSTED_LABEL))
        .map(|job| job.name.clone())
        .collect();

    if self_hosted_jobs.is_empty() {
        return AuditResult::pass(AuditKind::SelfHostedRunner, "Self hosted runner is not used");
    }

    AuditResult::fail(
        AuditKind::SelfHostedRunner,
        "Self hosted runner is used",
        self_hosted_jobs,
    )
}
