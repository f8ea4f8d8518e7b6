//! Data-integrity checks over a loaded storage
//!
//! Missing parts and finish-dependency cycles are errors. Every other
//! unresolved reference and any key shared within one collection is a
//! warning.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::core::entity::Entity;
use crate::core::identity::EntityKind;
use crate::core::partkey::{extract_step_key, producing_step_key};
use crate::core::resolver::find_steps_this_depends_on;
use crate::core::storage::Storage;
use crate::entities::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub kind: EntityKind,
    /// Key of the offending entity
    pub entity: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    fn push(&mut self, severity: Severity, kind: EntityKind, entity: &str, message: String) {
        self.issues.push(Issue {
            severity,
            kind,
            entity: entity.to_string(),
            message,
        });
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Run every check against `storage`
pub fn validate(storage: &Storage) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_duplicate_keys(storage, &mut report);
    check_parts(storage, &mut report);
    for step in storage.steps.values() {
        check_step(storage, step, &mut report);
    }
    check_cycles(storage, &mut report);

    tracing::debug!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        "validation finished"
    );
    report
}

fn check_duplicate_keys(storage: &Storage, report: &mut ValidationReport) {
    for &kind in EntityKind::all() {
        for (key, pks) in storage.duplicate_keys(kind) {
            report.push(
                Severity::Warning,
                kind,
                key,
                format!("key shared by {} records: {}", pks.len(), pks.join(", ")),
            );
        }
    }
}

fn check_parts(storage: &Storage, report: &mut ValidationReport) {
    for part in storage.parts.values() {
        for component in part.bom.keys() {
            if !storage.has_key(EntityKind::Part, component) {
                report.push(
                    Severity::Error,
                    EntityKind::Part,
                    part.key(),
                    format!("bom component '{}' is not a known part", component),
                );
            }
        }
    }
}

fn check_step(storage: &Storage, step: &Step, report: &mut ValidationReport) {
    let key = step.key();

    for part_ref in step.inputparts.keys() {
        let (base, _) = extract_step_key(part_ref);
        if !storage.has_key(EntityKind::Part, &base) {
            report.push(
                Severity::Error,
                EntityKind::Step,
                key,
                format!("input part '{}' is not a known part", base),
            );
        }
        if let Some(producer) = producing_step_key(part_ref) {
            if !storage.has_key(EntityKind::Step, &producer) {
                report.push(
                    Severity::Warning,
                    EntityKind::Step,
                    key,
                    format!("input '{}' names unknown producing step '{}'", part_ref, producer),
                );
            }
        }
    }

    for part_key in step.outputparts.keys() {
        if !storage.has_key(EntityKind::Part, part_key) {
            report.push(
                Severity::Error,
                EntityKind::Step,
                key,
                format!("output part '{}' is not a known part", part_key),
            );
        }
    }

    let step_refs = step
        .start_after
        .keys()
        .map(|k| ("start_after", k.as_str()))
        .chain(step.start_after_start.keys().map(|k| ("start_after_start", k.as_str())))
        .chain(step.qcfailstep.as_deref().map(|k| ("qcfailstep", k)));
    for (field, target) in step_refs {
        if !storage.has_key(EntityKind::Step, target) {
            report.push(
                Severity::Warning,
                EntityKind::Step,
                key,
                format!("{} references unknown step '{}'", field, target),
            );
        }
    }

    let resource_refs = [
        (EntityKind::Tool, &step.tools),
        (EntityKind::Machine, &step.machines),
        (EntityKind::Role, &step.roles),
        (EntityKind::Action, &step.actions),
        (EntityKind::Consumable, &step.consumables),
    ];
    for (kind, map) in resource_refs {
        for target in map.keys() {
            if !storage.has_key(kind, target) {
                report.push(
                    Severity::Warning,
                    EntityKind::Step,
                    key,
                    format!("unknown {} '{}'", kind, target),
                );
            }
        }
    }

    let single_refs = [
        (EntityKind::Location, step.location.as_deref()),
        (EntityKind::Company, step.company.as_deref()),
    ];
    for (kind, target) in single_refs {
        if let Some(target) = target {
            if !storage.has_key(kind, target) {
                report.push(
                    Severity::Warning,
                    EntityKind::Step,
                    key,
                    format!("unknown {} '{}'", kind, target),
                );
            }
        }
    }
}

fn check_cycles(storage: &Storage, report: &mut ValidationReport) {
    let mut graph: DiGraph<&Step, ()> = DiGraph::new();
    let nodes: HashMap<&str, NodeIndex> = storage
        .steps
        .values()
        .map(|step| (step.pk(), graph.add_node(step)))
        .collect();

    for step in storage.steps.values() {
        let from = nodes[step.pk()];
        for dep in find_steps_this_depends_on(step, storage) {
            if let Some(&to) = nodes.get(dep.pk()) {
                graph.update_edge(from, to, ());
            }
        }
    }

    for component in tarjan_scc(&graph) {
        let cyclic = component.len() > 1
            || component
                .first()
                .is_some_and(|&v| graph.contains_edge(v, v));
        if !cyclic {
            continue;
        }

        let mut members: Vec<&str> = component.iter().map(|&i| graph[i].key()).collect();
        members.sort_unstable();
        report.push(
            Severity::Error,
            EntityKind::Step,
            members[0],
            format!("finish-dependency cycle: {}", members.join(" -> ")),
        );
    }
}
