//! Simulated receptionist slot plans
//!
//! In demo mode each worker negotiates against a simulated receptionist
//! whose available slots come from a per-provider plan file, falling
//! back to a shared mock slot table.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::domain::SlotTime;
use crate::error::Result;

/// Shared mock slots used when a provider has no plan entry.
pub const MOCK_SLOTS: &[&str] = &[
    "8:00 AM", "8:30 AM", "9:00 AM", "9:15 AM", "9:30 AM", "10:00 AM", "10:30 AM", "11:00 AM",
    "11:45 AM", "1:00 PM", "2:15 PM", "3:00 PM", "4:30 PM",
];

#[derive(Debug, Deserialize)]
struct PlanFile {
    #[serde(default, rename = "byProviderId")]
    by_provider_id: HashMap<String, PlanEntry>,
}

#[derive(Debug, Deserialize)]
struct PlanEntry {
    #[serde(default)]
    slots: Vec<SlotTime>,
}

/// Per-provider simulated slot availability.
#[derive(Debug, Clone, Default)]
pub struct SimulationPlan {
    by_provider: HashMap<String, Vec<SlotTime>>,
}

impl SimulationPlan {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let file: PlanFile = serde_json::from_str(&raw)?;
        let by_provider = file
            .by_provider_id
            .into_iter()
            .filter(|(_, entry)| !entry.slots.is_empty())
            .map(|(id, entry)| (id, entry.slots))
            .collect();
        Ok(Self { by_provider })
    }

    /// Fix the slots offered for one provider (used heavily in tests to
    /// make negotiation outcomes deterministic).
    pub fn with_slots(mut self, provider_id: &str, slots: Vec<SlotTime>) -> Self {
        self.by_provider.insert(provider_id.to_string(), slots);
        self
    }

    /// Slots the simulated receptionist may offer for this provider.
    pub fn slots_for(&self, provider_id: &str) -> Vec<SlotTime> {
        match self.by_provider.get(provider_id) {
            Some(slots) if !slots.is_empty() => slots.clone(),
            _ => mock_slots(),
        }
    }
}

fn mock_slots() -> Vec<SlotTime> {
    MOCK_SLOTS
        .iter()
        .filter_map(|s| SlotTime::parse_lenient(s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_gets_mock_slots() {
        let plan = SimulationPlan::default();
        let slots = plan.slots_for("nobody");
        assert_eq!(slots.len(), MOCK_SLOTS.len());
    }

    #[test]
    fn test_with_slots_overrides() {
        let ten = SlotTime::parse_lenient("10:00 AM").expect("parses");
        let plan = SimulationPlan::default().with_slots("p1", vec![ten]);
        assert_eq!(plan.slots_for("p1"), vec![ten]);
    }

    #[test]
    fn test_from_file_parses_plan() {
        let path = std::env::temp_dir().join("callswarm-plan-test.json");
        let json = r#"{
            "byProviderId": {
                "p1": {"slots": ["9:00 AM", "10:00 AM"]},
                "p2": {"slots": []}
            }
        }"#;
        std::fs::write(&path, json).expect("write plan file");

        let plan = SimulationPlan::from_file(&path).expect("parses");
        assert_eq!(plan.slots_for("p1").len(), 2);
        // empty entries fall back to mocks
        assert_eq!(plan.slots_for("p2").len(), MOCK_SLOTS.len());

        std::fs::remove_file(&path).ok();
    }
}
