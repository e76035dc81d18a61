pub mod config;
pub mod error;
pub mod loader;
pub mod parser;
pub mod report;
pub mod security;

pub use config::AuditConfig;
pub use error::{AuditError, LoadError};
pub use loader::WorkflowLoader;
pub use parser::github::GitHubActionsParser;
pub use parser::workflow::{DocumentKind, Job, RunnerLabels, Step, Triggers, WorkflowDocument};
pub use report::{AuditOutcome, FileReport, RunSummary};
pub use security::{scan, AuditKind, AuditOptions, AuditResult};
