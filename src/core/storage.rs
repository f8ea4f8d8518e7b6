//! Project storage - the nine typed collections and their persistence
//!
//! [`Storage`] owns every entity for its lifetime. It is populated from the
//! project's `data/` directory, refreshed by clearing and reloading, and
//! written back after single-entity edits.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::entity::{Entity, EntityRef};
use crate::core::identity::{EntityKind, KEY_INDEX};
use crate::core::loader::{load_collection, save_collection};
use crate::core::store::{Collection, StoreError};
use crate::entities::{Part, Resource, Step};
use crate::json::JsonError;

/// Errors raised while loading or saving collections
#[derive(Debug, Error, Diagnostic)]
pub enum StorageError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Json(#[from] JsonError),

    #[error("invalid record '{pk}' in {file}: {message}")]
    #[diagnostic(code(mfgdocs::storage::record))]
    Record {
        file: String,
        pk: String,
        message: String,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// In-memory collections for every entity kind
#[derive(Debug, Clone)]
pub struct Storage {
    pub roles: Collection<Resource>,
    pub tools: Collection<Resource>,
    pub actions: Collection<Resource>,
    pub parts: Collection<Part>,
    pub locations: Collection<Resource>,
    pub machines: Collection<Resource>,
    pub consumables: Collection<Resource>,
    pub companies: Collection<Resource>,
    pub steps: Collection<Step>,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

fn insert<T: Entity>(collection: &mut Collection<T>, pk: impl Into<String>, entity: T) {
    let extra = entity.extra_keys();
    let extra: Vec<(&str, &str)> = extra.iter().map(|(k, v)| (*k, v.as_str())).collect();
    collection.add(pk, entity, &extra);
}

impl Storage {
    pub fn new() -> Self {
        Self {
            roles: Collection::new(EntityKind::Role.collection_name()),
            tools: Collection::new(EntityKind::Tool.collection_name()),
            actions: Collection::new(EntityKind::Action.collection_name()),
            parts: Collection::new(EntityKind::Part.collection_name()),
            locations: Collection::new(EntityKind::Location.collection_name()),
            machines: Collection::new(EntityKind::Machine.collection_name()),
            consumables: Collection::new(EntityKind::Consumable.collection_name()),
            companies: Collection::new(EntityKind::Company.collection_name()),
            steps: Collection::new(EntityKind::Step.collection_name()),
        }
    }

    /// Load every collection from `data_dir`
    pub fn load(data_dir: &Path) -> Result<Self, StorageError> {
        let mut storage = Self::new();
        storage.refresh(data_dir)?;
        Ok(storage)
    }

    /// Clear all collections and repopulate them from `data_dir`
    pub fn refresh(&mut self, data_dir: &Path) -> Result<(), StorageError> {
        self.clear();

        for &kind in EntityKind::all() {
            let path = data_dir.join(kind.file_name());
            match kind {
                EntityKind::Part => {
                    for part in load_collection::<Part>(&path)? {
                        self.add_part(part);
                    }
                }
                EntityKind::Step => {
                    for step in load_collection::<Step>(&path)? {
                        self.add_step(step);
                    }
                }
                _ => {
                    for resource in load_collection::<Resource>(&path)? {
                        self.add_resource(kind, resource);
                    }
                }
            }
            tracing::debug!(collection = kind.collection_name(), count = self.len(kind), "loaded");
        }

        self.warn_duplicate_keys();
        Ok(())
    }

    fn warn_duplicate_keys(&self) {
        for &kind in EntityKind::all() {
            for (key, pks) in self.duplicate_keys(kind) {
                tracing::warn!(
                    collection = kind.collection_name(),
                    key,
                    pks = ?pks,
                    "duplicate key; unique lookups will treat it as missing"
                );
            }
        }
    }

    /// Write every collection to `data_dir`
    pub fn save(&self, data_dir: &Path) -> Result<(), StorageError> {
        std::fs::create_dir_all(data_dir).map_err(|source| StorageError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        for &kind in EntityKind::all() {
            let path = data_dir.join(kind.file_name());
            match kind {
                EntityKind::Part => save_collection(&path, self.parts.values())?,
                EntityKind::Step => save_collection(&path, self.steps.values())?,
                _ => {
                    if let Some(collection) = self.resources(kind) {
                        save_collection(&path, collection.values())?;
                    }
                }
            }
        }

        tracing::debug!(path = %data_dir.display(), "saved all collections");
        Ok(())
    }

    pub fn clear(&mut self) {
        self.roles.clear();
        self.tools.clear();
        self.actions.clear();
        self.parts.clear();
        self.locations.clear();
        self.machines.clear();
        self.consumables.clear();
        self.companies.clear();
        self.steps.clear();
    }

    /// Resource collection for one of the seven plain resource kinds
    pub fn resources(&self, kind: EntityKind) -> Option<&Collection<Resource>> {
        match kind {
            EntityKind::Role => Some(&self.roles),
            EntityKind::Tool => Some(&self.tools),
            EntityKind::Action => Some(&self.actions),
            EntityKind::Location => Some(&self.locations),
            EntityKind::Machine => Some(&self.machines),
            EntityKind::Consumable => Some(&self.consumables),
            EntityKind::Company => Some(&self.companies),
            EntityKind::Part | EntityKind::Step => None,
        }
    }

    pub fn resources_mut(&mut self, kind: EntityKind) -> Option<&mut Collection<Resource>> {
        match kind {
            EntityKind::Role => Some(&mut self.roles),
            EntityKind::Tool => Some(&mut self.tools),
            EntityKind::Action => Some(&mut self.actions),
            EntityKind::Location => Some(&mut self.locations),
            EntityKind::Machine => Some(&mut self.machines),
            EntityKind::Consumable => Some(&mut self.consumables),
            EntityKind::Company => Some(&mut self.companies),
            EntityKind::Part | EntityKind::Step => None,
        }
    }

    /// Insert a resource under its own pk; ignored for Part and Step kinds
    pub fn add_resource(&mut self, kind: EntityKind, resource: Resource) {
        if let Some(collection) = self.resources_mut(kind) {
            let pk = resource.pk.clone();
            insert(collection, pk, resource);
        }
    }

    pub fn add_part(&mut self, part: Part) {
        let pk = part.pk().to_string();
        insert(&mut self.parts, pk, part);
    }

    pub fn add_step(&mut self, step: Step) {
        let pk = step.pk().to_string();
        insert(&mut self.steps, pk, step);
    }

    /// Number of entities of a kind
    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Part => self.parts.len(),
            EntityKind::Step => self.steps.len(),
            _ => self.resources(kind).map_or(0, Collection::len),
        }
    }

    pub fn is_empty(&self) -> bool {
        EntityKind::all().iter().all(|&kind| self.len(kind) == 0)
    }

    /// All entities of a kind in insertion order
    pub fn entities(&self, kind: EntityKind) -> Vec<EntityRef<'_>> {
        match kind {
            EntityKind::Part => self.parts.values().map(EntityRef::Part).collect(),
            EntityKind::Step => self.steps.values().map(EntityRef::Step).collect(),
            _ => self
                .resources(kind)
                .map(|c| c.values().map(|r| EntityRef::Resource(kind, r)).collect())
                .unwrap_or_default(),
        }
    }

    /// Find an entity by its key, falling back to its primary key
    pub fn find(&self, kind: EntityKind, key: &str) -> Option<EntityRef<'_>> {
        match kind {
            EntityKind::Part => lookup(&self.parts, key).map(EntityRef::Part),
            EntityKind::Step => lookup(&self.steps, key).map(EntityRef::Step),
            _ => self
                .resources(kind)
                .and_then(|c| lookup(c, key))
                .map(|r| EntityRef::Resource(kind, r)),
        }
    }

    /// Whether any entity of `kind` carries `key` (or has it as pk)
    pub fn has_key(&self, kind: EntityKind, key: &str) -> bool {
        match kind {
            EntityKind::Part => has_key(&self.parts, key),
            EntityKind::Step => has_key(&self.steps, key),
            _ => self.resources(kind).is_some_and(|c| has_key(c, key)),
        }
    }

    /// Keys shared by more than one entity of a kind
    pub fn duplicate_keys(&self, kind: EntityKind) -> Vec<(&str, Vec<&str>)> {
        match kind {
            EntityKind::Part => self.parts.duplicate_keys(KEY_INDEX),
            EntityKind::Step => self.steps.duplicate_keys(KEY_INDEX),
            _ => self
                .resources(kind)
                .map(|c| c.duplicate_keys(KEY_INDEX))
                .unwrap_or_default(),
        }
    }

    /// Every step carrying `key`
    pub fn steps_by_key(&self, key: &str) -> Vec<&Step> {
        self.steps.list_by_key(KEY_INDEX, key).unwrap_or_default()
    }

    /// The step carrying `key`, or with `key` as pk; `None` if absent or ambiguous
    pub fn step(&self, key: &str) -> Option<&Step> {
        lookup(&self.steps, key)
    }

    /// Primary key of the step carrying `key`, for in-place edits
    pub fn step_pk(&self, key: &str) -> Option<String> {
        self.step(key).map(|s| s.pk().to_string())
    }

    /// The part carrying `key`, or with `key` as pk
    ///
    /// Unlike step lookups this is a hard failure: a step referencing a part
    /// that does not exist is a data error. A key shared by several parts
    /// resolves to the first one stored, matching [`Storage::has_key`].
    pub fn require_part(&self, key: &str) -> Result<&Part, StoreError> {
        let shared = self.parts.list_by_key(KEY_INDEX, key).unwrap_or_default();
        if shared.len() > 1 {
            tracing::debug!(key, count = shared.len(), "part key is ambiguous, using first match");
        }
        match shared.first() {
            Some(part) => Ok(*part),
            None => self.parts.get(key),
        }
    }

    /// Next free key `<prefix><NNNN>` for a kind
    pub fn next_key(&self, kind: EntityKind, prefix: &str) -> String {
        let highest = self
            .entities(kind)
            .iter()
            .filter_map(|e| e.key().strip_prefix(prefix))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("{}{:04}", prefix, highest + 1)
    }
}

fn lookup<'a, T>(collection: &'a Collection<T>, key: &str) -> Option<&'a T> {
    collection
        .get_by_unique_key(KEY_INDEX, key)
        .or_else(|| collection.get(key).ok())
}

fn has_key<T>(collection: &Collection<T>, key: &str) -> bool {
    collection.list_by_key(KEY_INDEX, key).is_some() || collection.contains_pk(key)
}
