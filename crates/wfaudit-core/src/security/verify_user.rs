use crate::error::AuditError;
use crate::parser::workflow::{Job, WorkflowDocument};
use crate::security::checkout::is_unsafe_head_checkout;
use crate::security::{AuditKind, AuditResult};

/// The organization's pinned user-verification action.
pub const DEFAULT_VERIFY_USER_ACTION: &str =
    "deriv-com/shared-actions/.github/actions/verify_user_in_organization@v1";

/// A job is privileged when it checks out an untrusted head SHA.
pub fn is_privileged(job: &Job) -> bool {
    job.steps.iter().any(is_unsafe_head_checkout)
}

/// Jobs failing the verification rule, plus any faults hit along the way.
/// A faulty job is still listed so one bad job never hides the others.
#[derive(Debug, Default)]
struct Verification {
    failed: Vec<String>,
    faults: Vec<AuditError>,
}

/// Privileged jobs (per `privileged`) whose first step is not exactly
/// `verify_action`.
fn unverified_jobs<F>(doc: &WorkflowDocument, verify_action: &str, privileged: F) -> Verification
where
    F: Fn(&Job) -> bool,
{
    let mut verification = Verification::default();

    for job in doc.jobs.iter().filter(|job| privileged(job)) {
        let Some(first) = job.first_step() else {
            verification
                .faults
                .push(AuditError::PrivilegedJobWithoutSteps(job.name.clone()));
            verification.failed.push(job.name.clone());
            continue;
        };

        // Exact match pins the one trusted release
        if first.uses.as_deref() != Some(verify_action) {
            verification.failed.push(job.name.clone());
        }
    }

    verification
}

fn verification_result(doc: &WorkflowDocument, verification: Verification) -> AuditResult {
    let Verification { failed, faults } = verification;

    if let Some(err) = faults.first() {
        tracing::error!(file = %doc.source_file, error = %err, "verify user audit fault");
        return AuditResult {
            offenders: failed,
            ..AuditResult::fault(AuditKind::VerifyUser, err)
        };
    }

    if failed.is_empty() {
        AuditResult::pass(AuditKind::VerifyUser, "Verify user check passed")
    } else {
        AuditResult::fail(
            AuditKind::VerifyUser,
            "Missing verify user check, please add verify user at the start of these jobs",
            failed,
        )
    }
}

/// Check that every job checking out an untrusted ref verifies the
/// triggering user first.
pub fn audit_verify_user(doc: &WorkflowDocument, verify_action: &str) -> AuditResult {
    verification_result(doc, unverified_jobs(doc, verify_action, is_privileged))
}
