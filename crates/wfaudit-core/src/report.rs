use crate::security::{AuditKind, AuditResult};
use serde::{Deserialize, Serialize};

/// What happened to one audit for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditOutcome {
    Ran(AuditResult),
    Skipped { audit: AuditKind, reason: String },
}

impl AuditOutcome {
    pub fn audit(&self) -> AuditKind {
        match self {
            AuditOutcome::Ran(result) => result.audit,
            AuditOutcome::Skipped { audit, .. } => *audit,
        }
    }

    /// Skipped audits never fail a file.
    pub fn passed(&self) -> bool {
        match self {
            AuditOutcome::Ran(result) => result.passed,
            AuditOutcome::Skipped { .. } => true,
        }
    }
}

/// All audit outcomes for a single workflow file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub source_file: String,
    pub outcomes: Vec<AuditOutcome>,
}

impl FileReport {
    pub fn new(source_file: String) -> Self {
        Self {
            source_file,
            outcomes: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(AuditOutcome::passed)
    }

    pub fn failed_audits(&self) -> impl Iterator<Item = AuditKind> + '_ {
        self.outcomes
            .iter()
            .filter(|o| !o.passed())
            .map(AuditOutcome::audit)
    }
}

/// Aggregate over every file in one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub audited: usize,
    /// Files that could not be loaded, with the reason.
    pub skipped: Vec<(String, String)>,
    pub failed_files: Vec<String>,
}

impl RunSummary {
    pub fn record(&mut self, report: &FileReport) {
        self.audited += 1;
        if !report.passed() {
            self.failed_files.push(report.source_file.clone());
        }
    }

    pub fn record_skipped(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push((path.into(), reason.into()));
    }

    pub fn passed(&self) -> bool {
        self.failed_files.is_empty()
    }

    /// 1 if any file failed any audit, 0 otherwise. Unloadable files do
    /// not count as failures.
    pub fn exit_code(&self) -> u8 {
        if self.passed() {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(path: &str, results: Vec<AuditOutcome>) -> FileReport {
        FileReport {
            source_file: path.to_string(),
            outcomes: results,
        }
    }

    #[test]
    fn test_skipped_outcome_does_not_fail_file() {
        let r = report(
            "a.yml",
            vec![
                AuditOutcome::Skipped {
                    audit: AuditKind::SelfHostedRunner,
                    reason: "private".into(),
                },
                AuditOutcome::Ran(AuditResult::pass(AuditKind::RiskyTriggers, "ok")),
            ],
        );
        assert!(r.passed());
        assert_eq!(r.failed_audits().count(), 0);
    }

    #[test]
    fn test_summary_exit_code() {
        let mut summary = RunSummary::default();
        summary.record(&report(
            "ok.yml",
            vec![AuditOutcome::Ran(AuditResult::pass(AuditKind::VulnerableEnv, "ok"))],
        ));
        summary.record_skipped("missing.yml", "file does not exist");
        assert_eq!(summary.exit_code(), 0);

        summary.record(&report(
            "bad.yml",
            vec![AuditOutcome::Ran(AuditResult::fail(
                AuditKind::VulnerableEnv,
                "Vulnerable envs detected",
                vec![" env.X }}".into()],
            ))],
        ));
        assert_eq!(summary.audited, 2);
        assert_eq!(summary.failed_files, vec!["bad.yml"]);
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_report_serializes_with_status_tag() {
        let r = report(
            "a.yml",
            vec![AuditOutcome::Skipped {
                audit: AuditKind::VerifyUser,
                reason: "private".into(),
            }],
        );
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["outcomes"][0]["status"], "skipped");
        assert_eq!(json["outcomes"][0]["audit"], "VerifyUser");
    }
}
