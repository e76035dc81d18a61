use crate::parser::workflow::Step;
use once_cell::sync::Lazy;
use regex::Regex;

/// A trigger that runs with elevated privileges, paired with the event
/// field that holds the attacker-controlled commit.
#[derive(Debug)]
pub struct RiskyTrigger {
    pub event: &'static str,
    pub unsafe_ref: &'static str,
}

/// Risky triggers and the head SHA expression that makes a checkout unsafe.
pub const RISKY_TRIGGERS: &[RiskyTrigger] = &[
    RiskyTrigger {
        event: "pull_request_target",
        unsafe_ref: "github.event.pull_request.head.sha",
    },
    RiskyTrigger {
        event: "workflow_run",
        unsafe_ref: "github.event.workflow_run.head_sha",
    },
];

const CHECKOUT_ACTION: &str = "actions/checkout";

// Searched, not compared: `uses` carries an @ref and `ref` is usually
// wrapped in `${{ }}`.
static CHECKOUT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(CHECKOUT_ACTION).expect("checkout pattern is valid"));

static UNSAFE_REFS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    RISKY_TRIGGERS
        .iter()
        .map(|t| {
            let pattern = Regex::new(t.unsafe_ref).expect("unsafe ref pattern is valid");
            (t.event, pattern)
        })
        .collect()
});

/// Is this event one of the [`RISKY_TRIGGERS`]?
pub fn is_risky_trigger(event: &str) -> bool {
    RISKY_TRIGGERS.iter().any(|t| t.event == event)
}

fn ref_matches(step: &Step, pattern: &Regex) -> bool {
    step.with_value("ref")
        .is_some_and(|reference| pattern.is_match(reference))
}

/// A step whose `uses` mentions `actions/checkout` anywhere and whose
/// `with.ref` matches the unsafe ref paired with `event`.
pub fn is_unsafe_checkout_for(step: &Step, event: &str) -> bool {
    let is_checkout = step
        .uses
        .as_deref()
        .is_some_and(|uses| CHECKOUT_PATTERN.is_match(uses));
    if !is_checkout {
        return false;
    }

    UNSAFE_REFS
        .iter()
        .filter(|(trigger, _)| *trigger == event)
        .any(|(_, pattern)| ref_matches(step, pattern))
}

/// A step running exactly `actions/checkout` (any version) with a `with.ref`
/// matching any unsafe ref, regardless of which trigger is active.
pub fn is_unsafe_head_checkout(step: &Step) -> bool {
    step.action_name() == Some(CHECKOUT_ACTION)
        && UNSAFE_REFS.iter().any(|(_, pattern)| ref_matches(step, pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkout(uses: &str, reference: &str) -> Step {
        Step::uses(uses).with_param("ref", reference)
    }

    #[test]
    fn test_unsafe_checkout_for_trigger() {
        let step = checkout("actions/checkout@v4", "${{ github.event.pull_request.head.sha }}");
        assert!(is_unsafe_checkout_for(&step, "pull_request_target"));
        assert!(!is_unsafe_checkout_for(&step, "workflow_run"));

        let step = checkout("actions/checkout@v3", "${{ github.event.workflow_run.head_sha }}");
        assert!(is_unsafe_checkout_for(&step, "workflow_run"));
    }

    #[test]
    fn test_checkout_without_ref_is_safe() {
        let step = Step::uses("actions/checkout@v4");
        assert!(!is_unsafe_checkout_for(&step, "pull_request_target"));
        assert!(!is_unsafe_head_checkout(&step));
    }

    #[test]
    fn test_non_checkout_action_is_safe() {
        let step = checkout("actions/setup-node@v4", "${{ github.event.pull_request.head.sha }}");
        assert!(!is_unsafe_checkout_for(&step, "pull_request_target"));
        assert!(!is_unsafe_head_checkout(&step));
    }

    #[test]
    fn test_head_checkout_requires_exact_action_name() {
        let forked = checkout(
            "someone/actions/checkout@v4",
            "${{ github.event.workflow_run.head_sha }}",
        );
        // substring match is enough for the trigger audit
        assert!(is_unsafe_checkout_for(&forked, "workflow_run"));
        // but not for classifying a privileged job
        assert!(!is_unsafe_head_checkout(&forked));

        let real = checkout("actions/checkout@v4", "${{ github.event.workflow_run.head_sha }}");
        assert!(is_unsafe_head_checkout(&real));
    }

    #[test]
    fn test_risky_trigger_table() {
        assert!(is_risky_trigger("pull_request_target"));
        assert!(is_risky_trigger("workflow_run"));
        assert!(!is_risky_trigger("push"));
        assert!(!is_unsafe_checkout_for(
            &checkout("actions/checkout@v4", "${{ github.event.pull_request.head.sha }}"),
            "push"
        ));
    }
}
