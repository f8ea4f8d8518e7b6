//! Resource entity type - tools, machines, roles, actions, locations, consumables, companies

use serde::{Deserialize, Serialize};

use crate::core::entity::{field_contains, Entity};

/// A simple resource record
///
/// The seven plain resource kinds share this shape; the collection a
/// resource lives in determines what it is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Primary key within its collection
    #[serde(default)]
    pub pk: String,

    /// Human-assigned identifier (e.g., "DS-TOL-0003")
    #[serde(default)]
    pub key: String,

    /// Free-text annotation
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keywords: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Detailed description
    #[serde(default)]
    pub description: String,

    /// Image reference
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,

    /// Display color
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,

    /// External link (datasheet, inventory page, ...)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
}

impl Resource {
    /// Create a resource with the given key and name; the key doubles as pk
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            pk: key.clone(),
            key,
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn matches_lower(&self, needle_lower: &str) -> bool {
        field_contains(&self.name, needle_lower)
            || field_contains(&self.description, needle_lower)
            || field_contains(&self.key, needle_lower)
    }
}

impl Entity for Resource {
    fn pk(&self) -> &str {
        &self.pk
    }

    fn set_pk(&mut self, pk: String) {
        self.pk = pk;
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn keywords(&self) -> &str {
        &self.keywords
    }

    fn contains(&self, text: &str) -> bool {
        self.matches_lower(&text.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_contains_is_case_insensitive() {
        let mut tool = Resource::new("DS-TOL-0001", "Torque Wrench");
        tool.description = "Calibrated 5-50 Nm".to_string();

        assert!(tool.contains("wrench"));
        assert!(tool.contains("WRENCH"));
        assert!(tool.contains("tol-0001"));
        assert!(tool.contains("calibrated"));
        assert!(!tool.contains("hammer"));
    }

    #[test]
    fn test_resource_contains_ignores_keywords_and_url() {
        let mut tool = Resource::new("T1", "Drill");
        tool.keywords = "cordless".to_string();
        tool.url = "https://example.com/drill".to_string();

        assert!(!tool.contains("cordless"));
        assert!(!tool.contains("example"));
    }

    #[test]
    fn test_resource_deserializes_with_missing_fields() {
        let tool: Resource = serde_json::from_str(r#"{"key": "T1", "name": "Drill"}"#).unwrap();
        assert_eq!(tool.key, "T1");
        assert!(tool.pk.is_empty());
        assert!(tool.description.is_empty());
    }
}
