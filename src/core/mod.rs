//! Core module - storage, dependency resolution and graph export

pub mod config;
pub mod entity;
pub mod graph;
pub mod identity;
pub mod loader;
pub mod partkey;
pub mod project;
pub mod resolver;
pub mod search;
pub mod storage;
pub mod store;
pub mod validate;

pub use config::Config;
pub use entity::{Entity, EntityRef};
pub use graph::{bom_graph, flow_graph, Edge, FlowGraph, Node, NodeKind};
pub use identity::EntityKind;
pub use partkey::extract_step_key;
pub use project::{Project, ProjectError};
pub use resolver::{
    find_steps_after_start_with_this, find_steps_depending_on_this, find_steps_this_depends_on,
    find_steps_which_start_after_this_starts, StepDependencies,
};
pub use search::search;
pub use storage::{Storage, StorageError};
pub use store::{Collection, StoreError};
pub use validate::{validate, Issue, Severity, ValidationReport};
