//! In-memory entity collections with secondary indexes
//!
//! A [`Collection`] maps primary keys to values and keeps any number of named
//! secondary indexes (index name -> index value -> primary keys). Secondary
//! buckets keep primary keys in insertion order.

use miette::Diagnostic;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by hard store lookups
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{collection}: no entry '{key}'")]
    #[diagnostic(code(mfgdocs::store::not_found))]
    NotFound { collection: String, key: String },
}

/// A typed collection addressable by primary key and by secondary keys
#[derive(Debug, Clone)]
pub struct Collection<T> {
    name: String,
    data: HashMap<String, T>,
    /// Primary keys in first-insertion order
    order: Vec<String>,
    /// index name -> index value -> primary keys
    index: HashMap<String, HashMap<String, Vec<String>>>,
}

impl<T> Collection<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: HashMap::new(),
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert `value` under `pk` and register it in each `(index, value)` bucket
    ///
    /// An existing entry under `pk` is replaced and its previous index
    /// registrations are dropped, so a bucket never holds stale or repeated
    /// primary keys.
    pub fn add(&mut self, pk: impl Into<String>, value: T, extra_keys: &[(&str, &str)]) {
        let pk = pk.into();

        if self.data.insert(pk.clone(), value).is_some() {
            self.unindex(&pk);
        } else {
            self.order.push(pk.clone());
        }

        for (index_name, index_value) in extra_keys {
            self.index
                .entry((*index_name).to_string())
                .or_default()
                .entry((*index_value).to_string())
                .or_default()
                .push(pk.clone());
        }
    }

    fn unindex(&mut self, pk: &str) {
        for buckets in self.index.values_mut() {
            for pks in buckets.values_mut() {
                pks.retain(|p| p != pk);
            }
            buckets.retain(|_, pks| !pks.is_empty());
        }
    }

    /// Lookup by primary key
    pub fn get(&self, pk: &str) -> Result<&T, StoreError> {
        self.data.get(pk).ok_or_else(|| StoreError::NotFound {
            collection: self.name.clone(),
            key: pk.to_string(),
        })
    }

    pub fn get_mut(&mut self, pk: &str) -> Result<&mut T, StoreError> {
        let name = &self.name;
        self.data.get_mut(pk).ok_or_else(|| StoreError::NotFound {
            collection: name.clone(),
            key: pk.to_string(),
        })
    }

    /// Lookup by primary key, falling back to `default`
    pub fn get_with_default<'a>(&'a self, pk: &str, default: &'a T) -> &'a T {
        self.data.get(pk).unwrap_or(default)
    }

    /// The single value registered under `index_name = index_value`
    ///
    /// Returns `None` when the index or value is unknown, and also when more
    /// than one primary key shares the value: ambiguity reads as absence.
    pub fn get_by_unique_key(&self, index_name: &str, index_value: &str) -> Option<&T> {
        match self.bucket(index_name, index_value)? {
            [pk] => self.data.get(pk),
            _ => None,
        }
    }

    /// All values registered under `index_name = index_value`, in insertion order
    pub fn list_by_key(&self, index_name: &str, index_value: &str) -> Option<Vec<&T>> {
        let pks = self.bucket(index_name, index_value)?;
        Some(pks.iter().filter_map(|pk| self.data.get(pk)).collect())
    }

    fn bucket(&self, index_name: &str, index_value: &str) -> Option<&[String]> {
        self.index
            .get(index_name)?
            .get(index_value)
            .map(|pks| pks.as_slice())
    }

    /// Index values shared by more than one primary key, sorted by value
    pub fn duplicate_keys(&self, index_name: &str) -> Vec<(&str, Vec<&str>)> {
        let mut dups: Vec<(&str, Vec<&str>)> = self
            .index
            .get(index_name)
            .map(|buckets| {
                buckets
                    .iter()
                    .filter(|(_, pks)| pks.len() > 1)
                    .map(|(value, pks)| {
                        (value.as_str(), pks.iter().map(String::as_str).collect::<Vec<_>>())
                    })
                    .collect()
            })
            .unwrap_or_default();
        dups.sort_by(|a, b| a.0.cmp(b.0));
        dups
    }

    /// Reset both the primary mapping and all secondary indexes
    pub fn clear(&mut self) {
        self.data.clear();
        self.order.clear();
        self.index.clear();
    }

    pub fn contains_pk(&self, pk: &str) -> bool {
        self.data.contains_key(pk)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `(pk, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.order
            .iter()
            .filter_map(move |pk| self.data.get(pk).map(|v| (pk.as_str(), v)))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.iter().map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
