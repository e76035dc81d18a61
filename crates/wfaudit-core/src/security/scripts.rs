use crate::parser::workflow::WorkflowDocument;

/// Every `run:` script body in the document, in document order.
///
/// Job steps come first (job-then-step order), followed by the steps of a
/// composite action. Steps without `run` are skipped. The iterator is lazy
/// and `Clone`, so audits can walk it as many times as they need.
pub fn extract_scripts(doc: &WorkflowDocument) -> impl Iterator<Item = &str> + Clone + '_ {
    doc.job_steps()
        .chain(doc.composite_steps.iter().flatten())
        .filter_map(|step| step.run.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::workflow::{Job, Step};

    #[test]
    fn test_scripts_in_document_order() {
        let mut doc = WorkflowDocument::new("ci.yml");
        let mut lint = Job::new("lint");
        lint.steps.push(Step::uses("actions/checkout@v4"));
        lint.steps.push(Step::run("npm run lint"));
        doc.add_job(lint);

        let mut test = Job::new("test");
        test.steps.push(Step::run("npm test"));
        test.steps.push(Step::run("npm run e2e"));
        doc.add_job(test);

        doc.composite_steps = Some(vec![Step::run("./post.sh")]);

        let scripts: Vec<&str> = extract_scripts(&doc).collect();
        assert_eq!(scripts, vec!["npm run lint", "npm test", "npm run e2e", "./post.sh"]);
    }

    #[test]
    fn test_restartable() {
        let mut doc = WorkflowDocument::new("ci.yml");
        let mut job = Job::new("build");
        job.steps.push(Step::run("make"));
        doc.add_job(job);

        let scripts = extract_scripts(&doc);
        assert_eq!(scripts.clone().count(), 1);
        assert_eq!(scripts.count(), 1);
    }

    #[test]
    fn test_empty_document() {
        let doc = WorkflowDocument::new("ci.yml");
        assert_eq!(extract_scripts(&doc).count(), 0);
    }
}
