use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Represents a single step within a job or a composite action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub name: Option<String>,
    pub uses: Option<String>,
    pub with: BTreeMap<String, String>,
    pub run: Option<String>,
}

impl Step {
    /// A step that only runs a shell script.
    pub fn run(script: impl Into<String>) -> Self {
        Self {
            run: Some(script.into()),
            ..Self::default()
        }
    }

    /// A step that invokes an action.
    pub fn uses(action: impl Into<String>) -> Self {
        Self {
            uses: Some(action.into()),
            ..Self::default()
        }
    }

    /// Add a `with:` parameter, builder style.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with.insert(key.into(), value.into());
        self
    }

    /// Look up a `with:` parameter.
    pub fn with_value(&self, key: &str) -> Option<&str> {
        self.with.get(key).map(String::as_str)
    }

    /// The action name without its `@ref` suffix, e.g. `actions/checkout`.
    pub fn action_name(&self) -> Option<&str> {
        self.uses
            .as_deref()
            .map(|uses| uses.split('@').next().unwrap_or(uses))
    }
}

/// Runner labels requested by a job's `runs-on`.
///
/// `runs-on` may be a single label, a list of labels, or a mapping with
/// `group`/`labels`; the parser collapses all of them into this list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerLabels(Vec<String>);

impl RunnerLabels {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if !out.contains(&label) {
                out.push(label);
            }
        }
        Self(out)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }
}

/// The workflow's trigger events, in document order without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triggers(Vec<String>);

impl Triggers {
    pub fn new<I, S>(events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for event in events {
            let event = event.into();
            if !out.contains(&event) {
                out.push(event);
            }
        }
        Self(out)
    }

    /// Is the given event (e.g. `pull_request_target`) a trigger?
    pub fn contains(&self, event: &str) -> bool {
        self.0.iter().any(|e| e == event)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A named job. Step order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub runs_on: RunnerLabels,
    pub steps: Vec<Step>,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runs_on: RunnerLabels::default(),
            steps: Vec::new(),
        }
    }

    /// The step that runs first, if any.
    pub fn first_step(&self) -> Option<&Step> {
        self.steps.first()
    }
}

/// Top-level shape of the parsed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    /// A workflow with a `jobs:` mapping.
    Workflow,
    /// A composite action with `runs.steps`.
    CompositeAction,
    /// Neither shape was found.
    Unknown,
}

/// The normalized in-memory form of one workflow or composite action file.
///
/// Built once per input file and only ever borrowed by the audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    pub source_file: String,
    pub name: Option<String>,
    pub kind: DocumentKind,
    pub triggers: Triggers,
    pub jobs: Vec<Job>,
    pub composite_steps: Option<Vec<Step>>,
}

impl WorkflowDocument {
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            name: None,
            kind: DocumentKind::Unknown,
            triggers: Triggers::default(),
            jobs: Vec::new(),
            composite_steps: None,
        }
    }

    /// Append a job, marking the document as a workflow.
    pub fn add_job(&mut self, job: Job) {
        self.kind = DocumentKind::Workflow;
        self.jobs.push(job);
    }

    /// Get a job by its name.
    pub fn get_job(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.name == name)
    }

    /// Get all job names in document order.
    pub fn job_names(&self) -> Vec<String> {
        self.jobs.iter().map(|j| j.name.clone()).collect()
    }

    /// Iterate every step of every job, job-then-step order.
    pub fn job_steps(&self) -> impl Iterator<Item = &Step> + Clone + '_ {
        self.jobs.iter().flat_map(|job| job.steps.iter())
    }

    /// Get total step count across all jobs and composite steps.
    pub fn step_count(&self) -> usize {
        self.jobs.iter().map(|j| j.steps.len()).sum::<usize>()
            + self.composite_steps.as_ref().map_or(0, Vec::len)
    }
}
