use crate::parser::workflow::WorkflowDocument;
use crate::security::checkout::{is_risky_trigger, is_unsafe_checkout_for};
use crate::security::{AuditKind, AuditResult};

/// Detect risky triggers (`pull_request_target`, `workflow_run`) that also
/// check out the untrusted head commit.
///
/// The trigger alone is not flagged; a matching `actions/checkout` step with
/// the unsafe `ref` has to exist somewhere in the workflow.
pub fn audit_risky_triggers(doc: &WorkflowDocument) -> AuditResult {
    let detected: Vec<String> = doc
        .triggers
        .iter()
        .filter(|event| is_risky_trigger(event))
        .filter(|event| {
            doc.job_steps()
                .any(|step| is_unsafe_checkout_for(step, event))
        })
        .map(String::from)
        .collect();

    if detected.is_empty() {
        return AuditResult::pass(AuditKind::RiskyTriggers, "No risky actions detected");
    }

    AuditResult::fail(AuditKind::RiskyTriggers, "Risky actions detected", detected)
}
