//! Entity kinds - the fixed set of collections a project stores

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the secondary index every entity registers its `key` under
pub const KEY_INDEX: &str = "key";

/// Entity kinds, one collection each
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Personnel role (operator, inspector, ...)
    Role,
    /// Hand tool or fixture
    Tool,
    /// Labor action billed per hour
    Action,
    /// Trackable item: input, output or BOM component
    Part,
    /// Physical location
    Location,
    /// Machine or station
    Machine,
    /// Consumable material
    Consumable,
    /// Responsible company
    Company,
    /// Manufacturing step
    Step,
}

impl EntityKind {
    /// Singular lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Role => "role",
            EntityKind::Tool => "tool",
            EntityKind::Action => "action",
            EntityKind::Part => "part",
            EntityKind::Location => "location",
            EntityKind::Machine => "machine",
            EntityKind::Consumable => "consumable",
            EntityKind::Company => "company",
            EntityKind::Step => "step",
        }
    }

    /// Collection name, also the stem of its data file
    pub fn collection_name(&self) -> &'static str {
        match self {
            EntityKind::Role => "roles",
            EntityKind::Tool => "tools",
            EntityKind::Action => "actions",
            EntityKind::Part => "parts",
            EntityKind::Location => "locations",
            EntityKind::Machine => "machines",
            EntityKind::Consumable => "consumables",
            EntityKind::Company => "companies",
            EntityKind::Step => "steps",
        }
    }

    /// Data file name (e.g. "steps.json")
    pub fn file_name(&self) -> String {
        format!("{}.json", self.collection_name())
    }

    /// True for the seven plain resource kinds (everything except Part and Step)
    pub fn is_resource(&self) -> bool {
        !matches!(self, EntityKind::Part | EntityKind::Step)
    }

    /// All kinds in load order
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Role,
            EntityKind::Tool,
            EntityKind::Action,
            EntityKind::Part,
            EntityKind::Location,
            EntityKind::Machine,
            EntityKind::Consumable,
            EntityKind::Company,
            EntityKind::Step,
        ]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        EntityKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == lower || k.collection_name() == lower)
            .ok_or_else(|| {
                format!(
                    "Unknown entity kind: {}. Use role, tool, action, part, location, machine, consumable, company, or step",
                    s
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str_accepts_singular_and_plural() {
        assert_eq!("step".parse::<EntityKind>().unwrap(), EntityKind::Step);
        assert_eq!("Companies".parse::<EntityKind>().unwrap(), EntityKind::Company);
        assert_eq!(" TOOLS ".parse::<EntityKind>().unwrap(), EntityKind::Tool);
        assert!("widget".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_nine_kinds_seven_resources() {
        assert_eq!(EntityKind::all().len(), 9);
        assert_eq!(EntityKind::all().iter().filter(|k| k.is_resource()).count(), 7);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(EntityKind::Company.file_name(), "companies.json");
        assert_eq!(EntityKind::Step.to_string(), "step");
    }
}
