//! Part entity type - trackable items with an optional bill of materials

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::entity::Entity;
use crate::entities::resource::Resource;

/// A Part entity - input, output or component of other parts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(flatten)]
    pub resource: Resource,

    /// Bill of materials: component part key -> quantity
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bom: BTreeMap<String, f64>,

    /// Unit of measure (e.g., "pcs", "kg")
    #[serde(default)]
    pub unit: String,
}

impl Part {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource: Resource::new(key, name),
            bom: BTreeMap::new(),
            unit: String::new(),
        }
    }

    /// Builder-style unit setter
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Add a BOM component, accumulating quantity for an existing component
    pub fn add_component(&mut self, part_key: impl Into<String>, quantity: f64) {
        *self.bom.entry(part_key.into()).or_insert(0.0) += quantity;
    }

    pub fn remove_component(&mut self, part_key: &str) {
        self.bom.remove(part_key);
    }
}

impl Entity for Part {
    fn pk(&self) -> &str {
        &self.resource.pk
    }

    fn set_pk(&mut self, pk: String) {
        self.resource.pk = pk;
    }

    fn key(&self) -> &str {
        &self.resource.key
    }

    fn name(&self) -> &str {
        &self.resource.name
    }

    fn keywords(&self) -> &str {
        &self.resource.keywords
    }

    fn contains(&self, text: &str) -> bool {
        self.resource.contains(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_flattens_resource_fields() {
        let json = r#"{"pk": "7", "key": "WIDGET-1", "name": "Widget", "unit": "pcs", "bom": {"SCREW": 4}}"#;
        let part: Part = serde_json::from_str(json).unwrap();

        assert_eq!(part.pk(), "7");
        assert_eq!(part.key(), "WIDGET-1");
        assert_eq!(part.unit, "pcs");
        assert_eq!(part.bom.get("SCREW"), Some(&4.0));
    }

    #[test]
    fn test_add_component_accumulates() {
        let mut part = Part::new("ASM", "Assembly");
        part.add_component("SCREW", 2.0);
        part.add_component("SCREW", 3.0);
        part.add_component("NUT", 1.0);
        part.remove_component("NUT");

        assert_eq!(part.bom.len(), 1);
        assert_eq!(part.bom["SCREW"], 5.0);
    }

    #[test]
    fn test_new_parts_do_not_share_bom() {
        let mut a = Part::new("A", "A");
        let b = Part::new("B", "B");
        a.add_component("X", 1.0);
        assert!(b.bom.is_empty());
    }
}
