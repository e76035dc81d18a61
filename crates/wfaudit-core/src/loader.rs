use crate::config::DEFAULT_TRUSTED_DIR;
use crate::error::LoadError;
use crate::parser::github::GitHubActionsParser;
use crate::parser::workflow::WorkflowDocument;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

const YAML_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// Loads workflow files from user-supplied relative paths, refusing
/// anything that does not resolve to a YAML file directly inside the
/// trusted workflow directory.
#[derive(Debug, Clone)]
pub struct WorkflowLoader {
    root: PathBuf,
    trusted_dir: String,
}

impl WorkflowLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_trusted_dir(root, DEFAULT_TRUSTED_DIR)
    }

    pub fn with_trusted_dir(root: impl Into<PathBuf>, trusted_dir: &str) -> Self {
        Self {
            root: root.into(),
            trusted_dir: trusted_dir.trim_end_matches('/').to_string(),
        }
    }

    pub fn trusted_dir(&self) -> &str {
        &self.trusted_dir
    }

    /// Validate `path` (relative to the root) and parse it.
    pub fn load(&self, path: &str) -> Result<WorkflowDocument, LoadError> {
        let full_path = self.validate(path)?;
        let content = std::fs::read_to_string(&full_path).map_err(|source| LoadError::Io {
            path: full_path.clone(),
            source,
        })?;
        debug!(path, "loaded workflow file");
        GitHubActionsParser::parse(&content, path.to_string())
    }

    /// Run every path check and return the canonical file path.
    pub fn validate(&self, path: &str) -> Result<PathBuf, LoadError> {
        let prefix = format!("{}/", self.trusted_dir);
        if !path.starts_with(&prefix) {
            return Err(LoadError::InvalidPrefix(
                path.to_string(),
                self.trusted_dir.clone(),
            ));
        }

        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(LoadError::OutsideTrustedDir(path.to_string()));
        }

        let is_yaml = relative
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| YAML_EXTENSIONS.contains(&ext));
        if !is_yaml {
            return Err(LoadError::NotYaml(path.to_string()));
        }

        let full_path = self.root.join(relative);
        if !full_path.is_file() {
            return Err(LoadError::NotFound(full_path));
        }

        // Catches symlinks and nested directories
        let trusted = self.canonicalize(&self.root.join(&self.trusted_dir))?;
        let resolved = self.canonicalize(&full_path)?;
        if resolved.parent() != Some(trusted.as_path()) {
            warn!(path, resolved = %resolved.display(), "workflow path escapes trusted directory");
            return Err(LoadError::OutsideTrustedDir(path.to_string()));
        }

        Ok(resolved)
    }

    /// Every YAML file directly inside the trusted directory, as relative
    /// paths suitable for [`WorkflowLoader::load`], sorted.
    pub fn discover(&self) -> Vec<String> {
        let dir = self.root.join(&self.trusted_dir);
        let escaped = glob::Pattern::escape(&dir.to_string_lossy());

        let mut found: Vec<String> = Vec::new();
        for ext in YAML_EXTENSIONS {
            let pattern = format!("{}/*.{}", escaped, ext);
            let paths = match glob::glob(&pattern) {
                Ok(paths) => paths,
                Err(e) => {
                    warn!(pattern = %pattern, error = %e, "invalid discovery pattern");
                    continue;
                }
            };
            for entry in paths.filter_map(|r| r.ok()) {
                if let Some(name) = entry.file_name().and_then(|n| n.to_str()) {
                    found.push(format!("{}/{}", self.trusted_dir, name));
                }
            }
        }

        found.sort();
        found
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, LoadError> {
        path.canonicalize().map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
