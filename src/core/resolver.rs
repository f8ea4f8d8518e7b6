//! Step dependency resolution
//!
//! Four directed views over the step graph, each a pure function of the
//! current storage. Finish-dependencies come from explicit `start_after`
//! links and, implicitly, from consuming an intermediate part `P(STEP)`.
//! Start-dependencies come from `start_after_start` only.
//!
//! Step keys resolve through the `key` index and every step carrying a key is
//! returned, so `depends_on(a)` contains `b` exactly when
//! `depending_on(b)` contains `a`. Keys naming no step are skipped.

use std::collections::HashSet;

use crate::core::entity::Entity;
use crate::core::partkey::producing_step_key;
use crate::core::storage::Storage;
use crate::entities::Step;

/// Step keys `step` must wait on to finish
fn finish_dependency_keys(step: &Step) -> impl Iterator<Item = String> + '_ {
    step.inputparts
        .keys()
        .filter_map(|part_ref| producing_step_key(part_ref))
        .chain(step.start_after.keys().cloned())
}

fn has_finish_dependency_on(step: &Step, step_key: &str) -> bool {
    step.start_after.contains_key(step_key)
        || step
            .inputparts
            .keys()
            .any(|part_ref| producing_step_key(part_ref).as_deref() == Some(step_key))
}

fn sorted_unique(mut steps: Vec<&Step>) -> Vec<&Step> {
    let mut seen = HashSet::new();
    steps.retain(|s| seen.insert(s.pk().to_string()));
    steps.sort_by(|a, b| a.key().cmp(b.key()).then_with(|| a.pk().cmp(b.pk())));
    steps
}

fn resolve_keys<'a, I>(storage: &'a Storage, keys: I) -> Vec<&'a Step>
where
    I: IntoIterator<Item = String>,
{
    let mut steps = Vec::new();
    for key in keys {
        let found = storage.steps_by_key(&key);
        if found.is_empty() {
            tracing::trace!(step_key = %key, "skipping dangling step reference");
        }
        steps.extend(found);
    }
    sorted_unique(steps)
}

/// Steps that must finish before `step` can start
pub fn find_steps_this_depends_on<'a>(step: &Step, storage: &'a Storage) -> Vec<&'a Step> {
    resolve_keys(storage, finish_dependency_keys(step))
}

/// Steps `step` may start alongside once they have started
pub fn find_steps_after_start_with_this<'a>(step: &Step, storage: &'a Storage) -> Vec<&'a Step> {
    resolve_keys(storage, step.start_after_start.keys().cloned())
}

/// Steps whose `start_after_start` names `step`
pub fn find_steps_which_start_after_this_starts<'a>(
    step: &Step,
    storage: &'a Storage,
) -> Vec<&'a Step> {
    sorted_unique(
        storage
            .steps
            .values()
            .filter(|other| other.start_after_start.contains_key(step.key()))
            .collect(),
    )
}

/// Steps that cannot start until `step` has finished
pub fn find_steps_depending_on_this<'a>(step: &Step, storage: &'a Storage) -> Vec<&'a Step> {
    sorted_unique(
        storage
            .steps
            .values()
            .filter(|other| has_finish_dependency_on(other, step.key()))
            .collect(),
    )
}

/// The four views of a step as shown to a user
///
/// Finish relationships take precedence: a step listed in `must_finish_first`
/// is dropped from `can_start_together_with`, and one listed in
/// `must_wait_for_this` is dropped from `start_in_parallel_after_this_starts`.
#[derive(Debug, Clone, Default)]
pub struct StepDependencies<'a> {
    pub must_finish_first: Vec<&'a Step>,
    pub can_start_together_with: Vec<&'a Step>,
    pub must_wait_for_this: Vec<&'a Step>,
    pub start_in_parallel_after_this_starts: Vec<&'a Step>,
}

fn without<'a>(steps: Vec<&'a Step>, exclude: &[&Step]) -> Vec<&'a Step> {
    let excluded: HashSet<&str> = exclude.iter().map(|s| s.pk()).collect();
    steps
        .into_iter()
        .filter(|s| !excluded.contains(s.pk()))
        .collect()
}

impl<'a> StepDependencies<'a> {
    pub fn for_step(step: &Step, storage: &'a Storage) -> Self {
        let must_finish_first = find_steps_this_depends_on(step, storage);
        let must_wait_for_this = find_steps_depending_on_this(step, storage);
        let can_start_together_with =
            without(find_steps_after_start_with_this(step, storage), &must_finish_first);
        let start_in_parallel_after_this_starts = without(
            find_steps_which_start_after_this_starts(step, storage),
            &must_wait_for_this,
        );

        Self {
            must_finish_first,
            can_start_together_with,
            must_wait_for_this,
            start_in_parallel_after_this_starts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.must_finish_first.is_empty()
            && self.can_start_together_with.is_empty()
            && self.must_wait_for_this.is_empty()
            && self.start_in_parallel_after_this_starts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn contains(list: &[&Step], step: &Step) -> bool {
        list.iter().any(|s| s.pk() == step.pk())
    }

    fn keys(steps: &[&Step]) -> Vec<String> {
        steps.iter().map(|s| s.key().to_string()).collect()
    }

    fn scenario() -> Storage {
        let mut storage = Storage::new();

        let mut s1 = Step::new("STEP-1", "Cut");
        s1.add_outputpart("P1", 1.0);
        storage.add_step(s1);

        let mut s2 = Step::new("STEP-2", "Assemble");
        s2.add_inputpart("P1(STEP-1)", 1.0);
        s2.add_outputpart("P2", 1.0);
        s2.is_final = true;
        storage.add_step(s2);

        storage
    }

    fn richer() -> Storage {
        let mut storage = scenario();

        let mut s3 = Step::new("STEP-3", "Paint");
        s3.add_start_after("STEP-2", Value::Null);
        s3.add_start_after("GHOST", Value::Null);
        s3.add_start_after_start("STEP-1", Value::Null);
        s3.add_start_after_start("STEP-2", Value::Null);
        storage.add_step(s3);

        let mut s4 = Step::new("STEP-4", "Inspect");
        s4.add_inputpart("P1(STEP-1)", 1.0);
        s4.add_inputpart("P2()", 1.0);
        s4.add_start_after("STEP-1", Value::Null);
        s4.add_start_after_start("STEP-3", Value::Null);
        storage.add_step(s4);

        storage
    }

    #[test]
    fn test_end_to_end_dependency() {
        let storage = scenario();
        let s1 = storage.step("STEP-1").unwrap();
        let s2 = storage.step("STEP-2").unwrap();

        assert_eq!(keys(&find_steps_this_depends_on(s2, &storage)), vec!["STEP-1"]);
        assert!(find_steps_this_depends_on(s1, &storage).is_empty());
        assert_eq!(keys(&find_steps_depending_on_this(s1, &storage)), vec!["STEP-2"]);
    }

    #[test]
    fn test_implicit_dependency_inference() {
        let mut storage = Storage::new();
        let mut a = Step::new("A", "Produce");
        a.add_outputpart("P", 1.0);
        storage.add_step(a);
        let mut b = Step::new("B", "Consume");
        b.add_inputpart("P(A)", 2.0);
        storage.add_step(b);

        let a = storage.step("A").unwrap();
        let b = storage.step("B").unwrap();
        assert_eq!(keys(&find_steps_this_depends_on(b, &storage)), vec!["A"]);
        assert_eq!(keys(&find_steps_depending_on_this(a, &storage)), vec!["B"]);
    }

    #[test]
    fn test_dangling_references_are_skipped() {
        let storage = richer();
        let s3 = storage.step("STEP-3").unwrap();
        assert_eq!(keys(&find_steps_this_depends_on(s3, &storage)), vec!["STEP-2"]);
    }

    #[test]
    fn test_empty_step_suffix_is_not_a_reference() {
        let storage = richer();
        let s4 = storage.step("STEP-4").unwrap();
        // P1(STEP-1) and start_after STEP-1 collapse into one entry; P2() adds nothing
        assert_eq!(keys(&find_steps_this_depends_on(s4, &storage)), vec!["STEP-1"]);
    }

    #[test]
    fn test_start_views() {
        let storage = richer();
        let s1 = storage.step("STEP-1").unwrap();
        let s3 = storage.step("STEP-3").unwrap();

        assert_eq!(
            keys(&find_steps_after_start_with_this(s3, &storage)),
            vec!["STEP-1", "STEP-2"]
        );
        assert_eq!(
            keys(&find_steps_which_start_after_this_starts(s1, &storage)),
            vec!["STEP-3"]
        );
        assert_eq!(
            keys(&find_steps_which_start_after_this_starts(s3, &storage)),
            vec!["STEP-4"]
        );
    }

    #[test]
    fn test_forward_and_inverse_views_are_symmetric() {
        let mut storage = richer();
        // A second step sharing a key must not break symmetry
        let mut dup = Step::new("STEP-2", "Assemble again");
        dup.resource.pk = "dup".to_string();
        dup.add_start_after_start("STEP-4", Value::Null);
        storage.add_step(dup);

        let all: Vec<&Step> = storage.steps.values().collect();

        for &a in &all {
            for &b in &all {
                assert_eq!(
                    contains(&find_steps_this_depends_on(a, &storage), b),
                    contains(&find_steps_depending_on_this(b, &storage), a),
                    "finish symmetry {} / {}",
                    a.pk(),
                    b.pk()
                );
                assert_eq!(
                    contains(&find_steps_after_start_with_this(a, &storage), b),
                    contains(&find_steps_which_start_after_this_starts(b, &storage), a),
                    "start symmetry {} / {}",
                    a.pk(),
                    b.pk()
                );
            }
        }
    }

    #[test]
    fn test_presentation_excludes_finish_dependencies() {
        let storage = richer();
        let s3 = storage.step("STEP-3").unwrap();
        let deps = StepDependencies::for_step(s3, &storage);

        assert_eq!(keys(&deps.must_finish_first), vec!["STEP-2"]);
        assert_eq!(keys(&deps.can_start_together_with), vec!["STEP-1"]);
        assert!(deps.must_wait_for_this.is_empty());
        assert_eq!(keys(&deps.start_in_parallel_after_this_starts), vec!["STEP-4"]);
    }

    #[test]
    fn test_presentation_excludes_dependents_from_parallel() {
        let mut storage = richer();
        let mut s5 = Step::new("STEP-5", "Pack");
        s5.add_start_after("STEP-1", Value::Null);
        s5.add_start_after_start("STEP-1", Value::Null);
        storage.add_step(s5);

        let s1 = storage.step("STEP-1").unwrap();
        let deps = StepDependencies::for_step(s1, &storage);

        assert_eq!(keys(&deps.must_wait_for_this), vec!["STEP-2", "STEP-4", "STEP-5"]);
        assert_eq!(keys(&deps.start_in_parallel_after_this_starts), vec!["STEP-3"]);
        assert!(!deps.is_empty());
    }
}
