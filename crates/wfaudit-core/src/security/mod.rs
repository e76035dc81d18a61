pub mod checkout;
pub mod env;
pub mod injection;
pub mod runner;
pub mod scripts;
pub mod triggers;
pub mod verify_user;

use crate::error::AuditError;
use crate::parser::workflow::WorkflowDocument;
use crate::report::{AuditOutcome, FileReport};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The individual checks, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditKind {
    SelfHostedRunner,
    RiskyTriggers,
    RiskyContexts,
    VulnerableEnv,
    VerifyUser,
}

impl AuditKind {
    pub const ALL: [AuditKind; 5] = [
        AuditKind::SelfHostedRunner,
        AuditKind::RiskyTriggers,
        AuditKind::RiskyContexts,
        AuditKind::VulnerableEnv,
        AuditKind::VerifyUser,
    ];

    pub fn id(&self) -> &str {
        match self {
            AuditKind::SelfHostedRunner => "self-hosted-runner",
            AuditKind::RiskyTriggers => "risky-triggers",
            AuditKind::RiskyContexts => "risky-contexts",
            AuditKind::VulnerableEnv => "vulnerable-env",
            AuditKind::VerifyUser => "verify-user",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            AuditKind::SelfHostedRunner => {
                "[Workflow Audit 2] Checking Self hosted Runner in Public Repo"
            }
            AuditKind::RiskyTriggers => "[Workflow Audit 5] Checking if risky actions is being used",
            AuditKind::RiskyContexts => {
                "[Workflow Audit 6.1] Checking if risky contexts is being used"
            }
            AuditKind::VulnerableEnv => {
                "[Workflow Audit 6.2] Checking if vulnerable envs is being used"
            }
            AuditKind::VerifyUser => {
                "[Workflow Audit 8] Checking Verify User Workflow on Public Workflows"
            }
        }
    }

    /// Checks that only make sense for publicly visible repositories.
    pub fn public_only(&self) -> bool {
        matches!(self, AuditKind::SelfHostedRunner | AuditKind::VerifyUser)
    }
}

/// The pass/fail outcome of one audit on one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    pub audit: AuditKind,
    pub passed: bool,
    pub detail: String,
    /// Offending items: triggers, contexts, job names or raw matches.
    pub offenders: Vec<String>,
}

impl AuditResult {
    pub fn pass(audit: AuditKind, detail: impl Into<String>) -> Self {
        Self {
            audit,
            passed: true,
            detail: detail.into(),
            offenders: Vec::new(),
        }
    }

    /// A failure whose detail ends with the comma-joined offenders.
    pub fn fail(audit: AuditKind, summary: &str, offenders: Vec<String>) -> Self {
        Self {
            audit,
            passed: false,
            detail: format!("{}: {}", summary, offenders.join(", ")),
            offenders,
        }
    }

    /// An internal fault inside the audit, reported as a failure.
    pub fn fault(audit: AuditKind, error: &AuditError) -> Self {
        Self {
            audit,
            passed: false,
            detail: format!("Exception occurred in {}: {}", audit.id(), error),
            offenders: Vec::new(),
        }
    }

    pub fn marker(&self) -> &str {
        if self.passed {
            "[ PASSED ]"
        } else {
            "[ FAILED ]"
        }
    }

    /// The uncolored result line, e.g. `[ FAILED ] Risky actions detected: workflow_run`.
    pub fn message(&self) -> String {
        format!("{} {}", self.marker(), self.detail)
    }
}

/// Per-run gating and tunables for the audits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOptions {
    /// Whether the audited repository is public.
    pub is_public: bool,
    /// The action reference privileged jobs must run first.
    pub verify_user_action: String,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            is_public: false,
            verify_user_action: verify_user::DEFAULT_VERIFY_USER_ACTION.to_string(),
        }
    }
}

/// Run one audit against a document.
pub fn run_audit(kind: AuditKind, doc: &WorkflowDocument, options: &AuditOptions) -> AuditResult {
    match kind {
        AuditKind::SelfHostedRunner => runner::audit_self_hosted_runner(doc),
        AuditKind::RiskyTriggers => triggers::audit_risky_triggers(doc),
        AuditKind::RiskyContexts => injection::audit_risky_contexts(doc),
        AuditKind::VulnerableEnv => env::audit_vulnerable_env(doc),
        AuditKind::VerifyUser => verify_user::audit_verify_user(doc, &options.verify_user_action),
    }
}

/// Run every applicable audit on a document.
///
/// Public-only audits are recorded as skipped for private repositories.
pub fn scan(doc: &WorkflowDocument, options: &AuditOptions) -> FileReport {
    let mut report = FileReport::new(doc.source_file.clone());

    for kind in AuditKind::ALL {
        if kind.public_only() && !options.is_public {
            debug!(audit = kind.id(), file = %doc.source_file, "skipped: repository is not public");
            report.outcomes.push(AuditOutcome::Skipped {
                audit: kind,
                reason: "Check is not applicable as the workflow is not public".to_string(),
            });
            continue;
        }

        info!(audit = kind.id(), file = %doc.source_file, "running audit");
        let result = run_audit(kind, doc, options);
        debug!(
            audit = kind.id(),
            passed = result.passed,
            offenders = result.offenders.len(),
            "audit finished"
        );
        report.outcomes.push(AuditOutcome::Ran(result));
    }

    report
}
