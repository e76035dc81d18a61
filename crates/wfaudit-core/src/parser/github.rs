use crate::error::LoadError;
use crate::parser::workflow::*;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Parser for GitHub Actions workflow and composite action YAML files.
pub struct GitHubActionsParser;

impl GitHubActionsParser {
    /// Parse a workflow file from disk into a WorkflowDocument.
    ///
    /// No path validation happens here; use the loader for untrusted paths.
    pub fn parse_file(path: &Path) -> Result<WorkflowDocument, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path.to_string_lossy().to_string())
    }

    /// Parse GitHub Actions YAML content into a WorkflowDocument.
    pub fn parse(content: &str, source_file: String) -> Result<WorkflowDocument, LoadError> {
        let yaml: Value = serde_yaml::from_str(content).map_err(|source| LoadError::InvalidYaml {
            path: source_file.clone(),
            source,
        })?;

        let root = match yaml.as_mapping() {
            Some(root) => root,
            None => return Err(LoadError::NotAMapping(source_file)),
        };

        let mut doc = WorkflowDocument::new(source_file);

        doc.name = root.get("name").and_then(|v| v.as_str()).map(String::from);
        doc.triggers = Self::parse_triggers(root);

        // Workflows carry `jobs`, composite actions carry `runs.steps`
        if let Some(jobs) = root.get("jobs").and_then(|v| v.as_mapping()) {
            for (job_id, job_config) in jobs {
                let Some(job_id) = job_id.as_str() else {
                    warn!(file = %doc.source_file, "skipping job with non-string id");
                    continue;
                };
                doc.add_job(Self::parse_job(job_id, job_config));
            }
            doc.kind = DocumentKind::Workflow;
        }

        if let Some(steps) = root
            .get("runs")
            .and_then(|runs| runs.get("steps"))
            .and_then(|v| v.as_sequence())
        {
            doc.composite_steps = Some(steps.iter().map(Self::parse_step).collect());
            if doc.kind == DocumentKind::Unknown {
                doc.kind = DocumentKind::CompositeAction;
            }
        }

        debug!(
            file = %doc.source_file,
            kind = ?doc.kind,
            triggers = doc.triggers.len(),
            jobs = doc.jobs.len(),
            steps = doc.step_count(),
            "parsed workflow document"
        );

        Ok(doc)
    }

    /// Find the `on:` value. YAML 1.1 emitters turn a bare `on` key into
    /// boolean `true`, so accept that spelling as well.
    fn trigger_value(root: &Mapping) -> Option<&Value> {
        root.get("on").or_else(|| {
            root.iter()
                .find(|(k, _)| matches!(k, Value::Bool(true)))
                .map(|(_, v)| v)
        })
    }

    fn parse_triggers(root: &Mapping) -> Triggers {
        let on = match Self::trigger_value(root) {
            Some(v) => v,
            None => return Triggers::default(),
        };

        match on {
            Value::String(event) => Triggers::new([event.as_str()]),
            Value::Sequence(events) => Triggers::new(events.iter().filter_map(|e| e.as_str())),
            Value::Mapping(map) => Triggers::new(map.keys().filter_map(|e| e.as_str())),
            _ => Triggers::default(),
        }
    }

    fn parse_job(job_id: &str, config: &Value) -> Job {
        let mut job = Job::new(job_id);

        if let Some(runs_on) = config.get("runs-on") {
            job.runs_on = Self::parse_runs_on(runs_on);
        }

        if let Some(steps) = config.get("steps").and_then(|v| v.as_sequence()) {
            job.steps = steps.iter().map(Self::parse_step).collect();
        }

        job
    }

    fn parse_runs_on(runs_on: &Value) -> RunnerLabels {
        match runs_on {
            Value::String(label) => RunnerLabels::new([label.as_str()]),
            Value::Sequence(seq) => RunnerLabels::new(seq.iter().filter_map(|v| v.as_str())),
            Value::Mapping(map) => {
                // runs-on: { group: ..., labels: ... }
                let mut labels: Vec<&str> = Vec::new();
                match map.get("labels") {
                    Some(Value::String(label)) => labels.push(label.as_str()),
                    Some(Value::Sequence(seq)) => {
                        labels.extend(seq.iter().filter_map(|v| v.as_str()))
                    }
                    _ => {}
                }
                RunnerLabels::new(labels)
            }
            _ => RunnerLabels::default(),
        }
    }

    fn parse_step(step: &Value) -> Step {
        let name = step.get("name").and_then(|v| v.as_str()).map(String::from);
        let uses = step.get("uses").and_then(|v| v.as_str()).map(String::from);
        let run = step.get("run").and_then(|v| v.as_str()).map(String::from);

        let with = step
            .get("with")
            .and_then(|v| v.as_mapping())
            .map(Self::parse_with)
            .unwrap_or_default();

        Step {
            name,
            uses,
            with,
            run,
        }
    }

    fn parse_with(with: &Mapping) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for (k, v) in with {
            let Some(key) = k.as_str() else { continue };
            let value = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            map.insert(key.to_string(), value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_workflow() {
        let yaml = r#"
name: CI
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - name: Build
        run: npm run build
  test:
    runs-on: [self-hosted, linux]
    steps:
      - run: npm test
"#;
        let doc = GitHubActionsParser::parse(yaml, "ci.yml".to_string()).unwrap();
        assert_eq!(doc.kind, DocumentKind::Workflow);
        assert_eq!(doc.name.as_deref(), Some("CI"));
        assert!(doc.triggers.contains("push"));
        assert_eq!(doc.job_names(), vec!["build", "test"]);

        let build = doc.get_job("build").unwrap();
        assert!(build.runs_on.contains("ubuntu-latest"));
        assert_eq!(build.steps.len(), 2);
        assert_eq!(build.steps[1].run.as_deref(), Some("npm run build"));

        let test = doc.get_job("test").unwrap();
        assert!(test.runs_on.contains("self-hosted"));
        assert!(test.runs_on.contains("linux"));
    }

    #[test]
    fn test_trigger_shapes_normalize() {
        let scalar = "on: pull_request_target\njobs: {}\n";
        let list = "on: [push, pull_request_target]\njobs: {}\n";
        let map = r#"
on:
  push:
    branches: [main]
  pull_request_target:
    types: [opened]
jobs: {}
"#;
        for yaml in [scalar, list, map] {
            let doc = GitHubActionsParser::parse(yaml, "ci.yml".to_string()).unwrap();
            assert!(doc.triggers.contains("pull_request_target"), "{yaml}");
        }
    }

    #[test]
    fn test_runs_on_group_labels() {
        let yaml = r#"
on: push
jobs:
  deploy:
    runs-on:
      group: prod
      labels: self-hosted
    steps:
      - run: ./deploy.sh
"#;
        let doc = GitHubActionsParser::parse(yaml, "ci.yml".to_string()).unwrap();
        assert!(doc.jobs[0].runs_on.contains("self-hosted"));
    }

    #[test]
    fn test_with_values_stringified() {
        let yaml = r#"
on: pull_request_target
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
        with:
          ref: ${{ github.event.pull_request.head.sha }}
          fetch-depth: 0
          persist-credentials: false
"#;
        let doc = GitHubActionsParser::parse(yaml, "ci.yml".to_string()).unwrap();
        let step = &doc.jobs[0].steps[0];
        assert_eq!(
            step.with_value("ref"),
            Some("${{ github.event.pull_request.head.sha }}")
        );
        assert_eq!(step.with_value("fetch-depth"), Some("0"));
        assert_eq!(step.with_value("persist-credentials"), Some("false"));
        assert_eq!(step.with_value("token"), None);
    }

    #[test]
    fn test_parse_composite_action() {
        let yaml = r#"
name: Setup
description: composite
runs:
  using: composite
  steps:
    - run: echo "${{ inputs.version }}"
      shell: bash
    - uses: actions/cache@v4
"#;
        let doc = GitHubActionsParser::parse(yaml, "action.yml".to_string()).unwrap();
        assert_eq!(doc.kind, DocumentKind::CompositeAction);
        assert!(doc.jobs.is_empty());
        assert!(doc.triggers.is_empty());
        assert_eq!(doc.composite_steps.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_missing_jobs_is_not_an_error() {
        let doc = GitHubActionsParser::parse("name: empty\n", "x.yml".to_string()).unwrap();
        assert_eq!(doc.kind, DocumentKind::Unknown);
        assert!(doc.jobs.is_empty());
    }

    #[test]
    fn test_non_mapping_root_rejected() {
        let err = GitHubActionsParser::parse("- a\n- b\n", "x.yml".to_string()).unwrap_err();
        assert!(matches!(err, LoadError::NotAMapping(_)));

        let err = GitHubActionsParser::parse("jobs: [unclosed", "x.yml".to_string()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidYaml { .. }));
    }
}
