//! Inbound call-confirmation boundary
//!
//! External voice-call results arrive as webhook payloads. This module
//! translates them into a closed set of internal types before they reach
//! the coordinator: string outcome identifiers become `CallOutcome`
//! variants and free-text slot phrases ("Tomorrow at 11:00 AM") are
//! normalized to `SlotTime`. Routing requires an agent id that resolves
//! through the registry; an unresolvable confirmation is dropped, never
//! an error.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::SlotTime;
use crate::swarm::SwarmRegistry;

/// Closed set of external negotiation outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    /// Provider accepted the proposed slot (still subject to the
    /// coordinator's slot-floor validation).
    Accepted,
    Declined,
    Unreachable,
}

impl CallOutcome {
    /// Translate legacy telephony status strings at the boundary.
    pub fn from_call_status(status: &str) -> Option<Self> {
        match status.trim().to_ascii_lowercase().as_str() {
            "accepted" | "completed" | "booked" => Some(Self::Accepted),
            "declined" | "rejected" => Some(Self::Declined),
            "unreachable" | "failed" | "no_answer" => Some(Self::Unreachable),
            _ => None,
        }
    }
}

/// One external confirmation event, as delivered by the webhook
/// transport collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallConfirmation {
    pub agent_id: String,
    pub outcome: CallOutcome,
    #[serde(default)]
    pub proposed_slot: Option<String>,
    #[serde(default)]
    pub raw_reasoning: Option<String>,
}

fn slot_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(\d{1,2}:\d{2})\s*([ap]\.?m\.?)").ok())
        .as_ref()
}

/// Extract a clock time from free text: "Today at 9:30 AM" → 9:30 AM.
/// Falls back to a direct lenient parse; `None` when nothing usable.
pub fn normalize_slot_time(raw: &str) -> Option<SlotTime> {
    if let Some(re) = slot_pattern() {
        if let Some(caps) = re.captures(raw) {
            let period = if caps[2].to_ascii_uppercase().starts_with('P') {
                "PM"
            } else {
                "AM"
            };
            return SlotTime::parse_lenient(&format!("{} {}", &caps[1], period));
        }
    }
    SlotTime::parse_lenient(raw)
}

/// Route a confirmation to its owning race via the registry.
///
/// Returns whether the confirmation was delivered. A confirmation whose
/// agent id does not resolve — unknown agent, or a race that already
/// completed and was deregistered — is dropped silently. There is
/// deliberately no "first incomplete race" fallback: under concurrent
/// races that would misattribute bookings.
pub async fn route_confirmation(registry: &SwarmRegistry, confirmation: CallConfirmation) -> bool {
    match registry.swarm_by_agent(&confirmation.agent_id) {
        Some(swarm) => {
            swarm
                .report_external_result(&confirmation.agent_id, &confirmation)
                .await;
            true
        }
        None => {
            debug!(
                agent_id = %confirmation.agent_id,
                outcome = ?confirmation.outcome,
                "confirmation dropped: no live race for agent"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_extracts_time_from_phrases() {
        let expected = SlotTime::parse_lenient("9:30 AM");
        assert_eq!(normalize_slot_time("Today at 9:30 AM"), expected);
        assert_eq!(normalize_slot_time("Tomorrow at 9:30am"), expected);
        assert_eq!(normalize_slot_time("9:30 A.M."), expected);
        assert_eq!(normalize_slot_time("9:30AM sharp"), expected);
    }

    #[test]
    fn test_normalize_plain_times() {
        assert_eq!(
            normalize_slot_time("11:00 PM"),
            SlotTime::parse_lenient("11:00 PM")
        );
        assert_eq!(normalize_slot_time("no idea"), None);
    }

    #[test]
    fn test_outcome_string_translation() {
        assert_eq!(
            CallOutcome::from_call_status("no_answer"),
            Some(CallOutcome::Unreachable)
        );
        assert_eq!(
            CallOutcome::from_call_status("Completed"),
            Some(CallOutcome::Accepted)
        );
        assert_eq!(CallOutcome::from_call_status("weird"), None);
    }

    #[test]
    fn test_confirmation_deserializes_from_wire_format() {
        let json = r#"{
            "agent_id": "agent-7",
            "outcome": "accepted",
            "proposed_slot": "Today at 10:00 AM",
            "raw_reasoning": "earliest opening"
        }"#;
        let conf: CallConfirmation = serde_json::from_str(json).expect("deserializes");
        assert_eq!(conf.outcome, CallOutcome::Accepted);
        assert_eq!(
            conf.proposed_slot.as_deref().and_then(normalize_slot_time),
            SlotTime::parse_lenient("10:00 AM")
        );
    }
}
