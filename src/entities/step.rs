//! Step entity type - one manufacturing operation consuming and producing parts

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::entity::{field_contains, Entity};
use crate::entities::resource::Resource;

/// A Step entity - the central record of a manufacturing process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub resource: Resource,

    /// Part reference key (possibly composite, `part(step)`) -> quantity consumed
    #[serde(default)]
    pub inputparts: BTreeMap<String, f64>,

    /// Part key -> quantity produced
    #[serde(default)]
    pub outputparts: BTreeMap<String, f64>,

    /// Tool key -> amount
    #[serde(default)]
    pub tools: BTreeMap<String, f64>,

    /// Machine key -> amount
    #[serde(default)]
    pub machines: BTreeMap<String, f64>,

    /// Role key -> amount
    #[serde(default)]
    pub roles: BTreeMap<String, f64>,

    /// Action key -> hours
    #[serde(default)]
    pub actions: BTreeMap<String, f64>,

    /// Consumable key -> amount
    #[serde(default)]
    pub consumables: BTreeMap<String, f64>,

    /// Location key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Responsible company key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    /// Steps that must finish before this one starts (step key -> metadata)
    #[serde(default)]
    pub start_after: BTreeMap<String, serde_json::Value>,

    /// Steps that must have started before this one starts (step key -> metadata)
    #[serde(default)]
    pub start_after_start: BTreeMap<String, serde_json::Value>,

    /// Outputs are end products (bare part keys in the flow graph)
    #[serde(default, rename = "final")]
    pub is_final: bool,

    /// Step to route to when the quality check fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qcfailstep: Option<String>,

    #[serde(default)]
    pub prepare_hours: f64,

    #[serde(default)]
    pub cooldown_hours: f64,

    #[serde(default)]
    pub unit_time_hours: f64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub prepare_text: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cleanup_text: String,

    /// Acceptance criteria
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub acceptance: String,
}

fn add_amount(map: &mut BTreeMap<String, f64>, key: impl Into<String>, amount: f64) {
    *map.entry(key.into()).or_insert(0.0) += amount;
}

impl Step {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource: Resource::new(key, name),
            ..Self::default()
        }
    }

    /// The resource-key mappings searched by [`Step::contains`], in display order
    pub fn resource_maps(&self) -> [(&'static str, &BTreeMap<String, f64>); 7] {
        [
            ("inputparts", &self.inputparts),
            ("outputparts", &self.outputparts),
            ("tools", &self.tools),
            ("actions", &self.actions),
            ("machines", &self.machines),
            ("roles", &self.roles),
            ("consumables", &self.consumables),
        ]
    }

    pub fn add_inputpart(&mut self, part_key: impl Into<String>, amount: f64) {
        add_amount(&mut self.inputparts, part_key, amount);
    }

    pub fn remove_inputpart(&mut self, part_key: &str) {
        self.inputparts.remove(part_key);
    }

    pub fn add_outputpart(&mut self, part_key: impl Into<String>, amount: f64) {
        add_amount(&mut self.outputparts, part_key, amount);
    }

    pub fn remove_outputpart(&mut self, part_key: &str) {
        self.outputparts.remove(part_key);
    }

    pub fn add_tool(&mut self, key: impl Into<String>, amount: f64) {
        add_amount(&mut self.tools, key, amount);
    }

    pub fn remove_tool(&mut self, key: &str) {
        self.tools.remove(key);
    }

    pub fn add_machine(&mut self, key: impl Into<String>, amount: f64) {
        add_amount(&mut self.machines, key, amount);
    }

    pub fn remove_machine(&mut self, key: &str) {
        self.machines.remove(key);
    }

    pub fn add_role(&mut self, key: impl Into<String>, amount: f64) {
        add_amount(&mut self.roles, key, amount);
    }

    pub fn remove_role(&mut self, key: &str) {
        self.roles.remove(key);
    }

    pub fn add_action(&mut self, key: impl Into<String>, hours: f64) {
        add_amount(&mut self.actions, key, hours);
    }

    pub fn remove_action(&mut self, key: &str) {
        self.actions.remove(key);
    }

    pub fn add_consumable(&mut self, key: impl Into<String>, amount: f64) {
        add_amount(&mut self.consumables, key, amount);
    }

    pub fn remove_consumable(&mut self, key: &str) {
        self.consumables.remove(key);
    }

    /// Insert or overwrite a finish-dependency
    pub fn add_start_after(&mut self, step_key: impl Into<String>, value: serde_json::Value) {
        self.start_after.insert(step_key.into(), value);
    }

    pub fn remove_start_after(&mut self, step_key: &str) {
        self.start_after.remove(step_key);
    }

    /// Insert or overwrite a start-dependency
    pub fn add_start_after_start(&mut self, step_key: impl Into<String>, value: serde_json::Value) {
        self.start_after_start.insert(step_key.into(), value);
    }

    pub fn remove_start_after_start(&mut self, step_key: &str) {
        self.start_after_start.remove(step_key);
    }

    pub fn set_location(&mut self, location_key: Option<String>) {
        self.location = location_key;
    }

    pub fn set_company(&mut self, company_key: Option<String>) {
        self.company = company_key;
    }

    pub fn set_qcfailstep(&mut self, step_key: Option<String>) {
        self.qcfailstep = step_key;
    }

    pub fn set_prepare_hours(&mut self, hours: f64) {
        self.prepare_hours = hours;
    }

    pub fn set_cooldown_hours(&mut self, hours: f64) {
        self.cooldown_hours = hours;
    }
}

impl Entity for Step {
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

    /// Matches the resource fields, the free-text fields, the raw location
    /// key, or any key (not value) of the resource mappings.
    ///
    /// Referenced resources are not resolved: a step using tool `T1` named
    /// "Drill" does not match "drill".
    fn contains(&self, text: &str) -> bool {
        let needle = text.to_lowercase();

        if self.resource.matches_lower(&needle) {
            return true;
        }

        let location = self.location.as_deref().unwrap_or("");
        let text_match = [
            self.acceptance.as_str(),
            self.prepare_text.as_str(),
            self.cleanup_text.as_str(),
            location,
        ]
        .iter()
        .any(|field| field_contains(field, &needle));

        text_match
            || self
                .resource_maps()
                .iter()
                .any(|(_, map)| map.keys().any(|key| field_contains(key, &needle)))
    }
}
