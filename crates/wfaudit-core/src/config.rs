use crate::security::verify_user::DEFAULT_VERIFY_USER_ACTION;
use crate::security::AuditOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the repository root.
pub const CONFIG_FILE_NAME: &str = ".wfaudit.toml";

/// Default directory workflows must live in, relative to the repository root.
pub const DEFAULT_TRUSTED_DIR: &str = ".github/workflows";

/// Audit configuration loaded from `.wfaudit.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// The pinned action reference privileged jobs must run first.
    pub verify_user_action: String,

    /// Directory workflow paths must resolve into.
    pub trusted_dir: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            verify_user_action: DEFAULT_VERIFY_USER_ACTION.to_string(),
            trusted_dir: DEFAULT_TRUSTED_DIR.to_string(),
        }
    }
}

impl AuditConfig {
    /// Build the per-run audit options.
    pub fn audit_options(&self, is_public: bool) -> AuditOptions {
        AuditOptions {
            is_public,
            verify_user_action: self.verify_user_action.clone(),
        }
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> anyhow::Result<AuditConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
    parse_config(&content)
        .map_err(|e| anyhow::anyhow!("Invalid config file '{}': {}", path.display(), e))
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AuditConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Load an explicit config file, or `.wfaudit.toml` under `root` if it
/// exists, or fall back to defaults.
pub fn resolve_config(root: &Path, explicit: Option<&Path>) -> anyhow::Result<AuditConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    let default_path: PathBuf = root.join(CONFIG_FILE_NAME);
    if default_path.is_file() {
        tracing::debug!(path = %default_path.display(), "using repository config");
        return load_config(&default_path);
    }

    Ok(AuditConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, AuditConfig::default());
        assert_eq!(config.trusted_dir, ".github/workflows");
    }

    #[test]
    fn test_override_verify_action() {
        let config = parse_config(r#"verify_user_action = "acme/verify@v2""#).unwrap();
        assert_eq!(config.verify_user_action, "acme/verify@v2");
        assert_eq!(config.trusted_dir, DEFAULT_TRUSTED_DIR);

        let options = config.audit_options(true);
        assert!(options.is_public);
        assert_eq!(options.verify_user_action, "acme/verify@v2");
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse_config("verify_action = \"x\"").is_err());
    }

    #[test]
    fn test_resolve_config_from_root() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_config(dir.path(), None).unwrap(),
            AuditConfig::default()
        );

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "trusted_dir = \"ci/workflows\"\n",
        )
        .unwrap();
        let config = resolve_config(dir.path(), None).unwrap();
        assert_eq!(config.trusted_dir, "ci/workflows");
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(resolve_config(dir.path(), Some(&missing)).is_err());
    }
}
