//! Entity trait - common interface for all entity types

use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{EntityKind, KEY_INDEX};
use crate::entities::{Part, Resource, Step};

/// Common trait for all stored records
pub trait Entity: Serialize + DeserializeOwned {
    /// Primary key within the owning collection
    fn pk(&self) -> &str;

    /// Set the primary key (the loader assigns it from the record mapping)
    fn set_pk(&mut self, pk: String);

    /// Human-assigned identifier used in cross-references
    fn key(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    /// Free-text annotation
    fn keywords(&self) -> &str;

    /// Case-insensitive substring match against the searchable fields
    fn contains(&self, text: &str) -> bool;

    /// Secondary index entries this entity registers in its collection
    fn extra_keys(&self) -> Vec<(&'static str, String)> {
        vec![(KEY_INDEX, self.key().to_string())]
    }
}

/// Borrowed view of any stored entity, tagged by kind
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Resource(EntityKind, &'a Resource),
    Part(&'a Part),
    Step(&'a Step),
}

impl<'a> EntityRef<'a> {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Resource(kind, _) => *kind,
            EntityRef::Part(_) => EntityKind::Part,
            EntityRef::Step(_) => EntityKind::Step,
        }
    }

    pub fn pk(&self) -> &'a str {
        match self {
            EntityRef::Resource(_, r) => r.pk(),
            EntityRef::Part(p) => p.pk(),
            EntityRef::Step(s) => s.pk(),
        }
    }

    pub fn key(&self) -> &'a str {
        match self {
            EntityRef::Resource(_, r) => r.key(),
            EntityRef::Part(p) => p.key(),
            EntityRef::Step(s) => s.key(),
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            EntityRef::Resource(_, r) => r.name(),
            EntityRef::Part(p) => p.name(),
            EntityRef::Step(s) => s.name(),
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        match self {
            EntityRef::Resource(_, r) => r.contains(text),
            EntityRef::Part(p) => p.contains(text),
            EntityRef::Step(s) => s.contains(text),
        }
    }

    /// Full record as a JSON value, for structured output
    pub fn to_value(&self) -> serde_json::Value {
        let value = match self {
            EntityRef::Resource(_, r) => serde_json::to_value(r),
            EntityRef::Part(p) => serde_json::to_value(p),
            EntityRef::Step(s) => serde_json::to_value(s),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

/// Case-insensitive containment of an already lowercased needle
pub(crate) fn field_contains(field: &str, needle_lower: &str) -> bool {
    field.to_lowercase().contains(needle_lower)
}
