//! Candidate agents and their per-race state machine

use serde::{Deserialize, Serialize};
use std::fmt;

use super::slot::SlotTime;
use crate::catalog::ProviderRecord;

/// Lifecycle of one provider-side negotiation attempt.
///
/// Transitions are monotonic: `idle/searching → calling → negotiating →
/// {secured, declined, superseded}`. The last three are terminal and
/// absorbing — once an agent is terminal, every further transition
/// attempt is a no-op, which is what lets the internal worker and an
/// external confirmation race each other safely for the same agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Searching,
    Calling,
    Negotiating,
    /// Proposed slot passed validation and was accepted.
    Secured,
    /// Slot failed validation, or the provider declined / was unreachable.
    Declined,
    /// Reached (or would have reached) a winning condition after the
    /// race already completed; kept observable instead of discarded.
    Superseded,
}

impl AgentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Secured | Self::Declined | Self::Superseded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Searching => "searching",
            Self::Calling => "calling",
            Self::Negotiating => "negotiating",
            Self::Secured => "secured",
            Self::Declined => "declined",
            Self::Superseded => "superseded",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One provider-side negotiation attempt within a race.
///
/// Created at race start from a catalog snapshot, mutated only by the
/// owning coordinator. Rating and distance are the static metadata
/// snapshot used for scoring; an assigned slot, once set, is never
/// cleared, only overwritten by a later valid transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateAgent {
    pub id: String,
    pub name: String,
    pub status: AgentStatus,
    #[serde(default)]
    pub slot: Option<SlotTime>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub distance_miles: Option<f64>,
    /// Whether this provider supports a live outbound call (results then
    /// arrive via webhook) rather than the simulated negotiation.
    #[serde(default)]
    pub call_ready: bool,
}

impl CandidateAgent {
    pub fn from_record(record: &ProviderRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            status: AgentStatus::Searching,
            slot: None,
            rating: record.rating,
            distance_miles: record.distance_miles,
            call_ready: record.live_call_ready,
        }
    }
}
