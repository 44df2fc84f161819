//! Race events and the broadcast emitter
//!
//! One event per agent state transition and exactly one `Completed`
//! event per race. The emitter is a side-effecting dependency of the
//! coordinator, not part of its decision logic: emitting with no live
//! subscribers is fine.

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::{AgentStatus, CandidateAgent, SlotTime};
use crate::scoring::RankedEntry;

/// Winner summary carried on `WinnerSelected` and `Completed`.
#[derive(Debug, Clone, Serialize)]
pub struct WinnerSummary {
    pub agent_id: String,
    pub provider_name: String,
    pub slot: Option<SlotTime>,
}

/// Events published to live subscribers over the broadcast channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SwarmEvent {
    /// Race registered and workers launched.
    Started {
        swarm_id: String,
        agents: Vec<CandidateAgent>,
        timestamp_ms: i64,
    },
    /// One agent state transition.
    AgentUpdate {
        swarm_id: String,
        agent_id: String,
        status: AgentStatus,
        slot: Option<SlotTime>,
        message: String,
    },
    /// The auto-selected winner (earliest secured slot).
    WinnerSelected {
        swarm_id: String,
        agent_id: String,
        provider_name: String,
        slot: Option<SlotTime>,
    },
    /// Final outcome; emitted exactly once per race.
    Completed {
        swarm_id: String,
        winner: Option<WinnerSummary>,
        agents: Vec<CandidateAgent>,
        shortlist: Vec<RankedEntry>,
    },
}

impl SwarmEvent {
    pub fn swarm_id(&self) -> &str {
        match self {
            Self::Started { swarm_id, .. }
            | Self::AgentUpdate { swarm_id, .. }
            | Self::WinnerSelected { swarm_id, .. }
            | Self::Completed { swarm_id, .. } => swarm_id,
        }
    }
}

/// Broadcast-backed event emitter handed to each coordinator.
#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: broadcast::Sender<SwarmEvent>,
}

impl EventEmitter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SwarmEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: SwarmEvent) {
        if self.tx.send(event).is_err() {
            trace!("swarm event emitted with no subscribers");
        }
    }
}

/// Millisecond UTC timestamp for event payloads.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
