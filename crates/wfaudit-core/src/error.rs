use std::path::PathBuf;
use thiserror::Error;

/// Why a workflow file could not be handed to the audits.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid workflow filepath '{0}': must start with {1}/")]
    InvalidPrefix(String, String),

    #[error("invalid file path '{0}': resolves outside the trusted workflow directory")]
    OutsideTrustedDir(String),

    #[error("not a YAML file: '{0}'")]
    NotYaml(String),

    #[error("file does not exist: '{}'", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML in '{path}'")]
    InvalidYaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("top level of '{0}' is not a mapping")]
    NotAMapping(String),
}

/// An internal fault inside a single audit.
///
/// These never escape the audit that raised them; they become a failed
/// result carrying the message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuditError {
    #[error("job '{0}' checks out an untrusted ref but has no steps")]
    PrivilegedJobWithoutSteps(String),
}
