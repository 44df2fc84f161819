//! Completion registry — routes late external confirmations home
//!
//! Two lookups: swarm-by-id and swarm-by-agent-id. An explicitly owned,
//! injectable store passed into each coordinator, not a module-level
//! global; lifecycle and test isolation stay explicit. Entries for a
//! race are inserted at start and all removed when arbitration
//! completes, so lookups after completion return `None`.

use std::sync::Arc;

use dashmap::DashMap;

use super::coordinator::{SwarmCoordinator, SwarmSnapshot};

#[derive(Debug, Default)]
pub struct SwarmRegistry {
    swarms: DashMap<String, Arc<SwarmCoordinator>>,
    agent_owner: DashMap<String, String>,
}

impl SwarmRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a race and all of its candidate agents.
    pub fn register(&self, swarm: Arc<SwarmCoordinator>, agent_ids: &[String]) {
        for id in agent_ids {
            self.agent_owner
                .insert(id.clone(), swarm.swarm_id().to_string());
        }
        self.swarms.insert(swarm.swarm_id().to_string(), swarm);
    }

    /// Look up a live race by id; `None` for unknown or completed races.
    pub fn swarm(&self, swarm_id: &str) -> Option<Arc<SwarmCoordinator>> {
        self.swarms.get(swarm_id).map(|e| e.value().clone())
    }

    /// Look up the race owning an agent; `None` when the agent is
    /// unknown or its race already completed.
    pub fn swarm_by_agent(&self, agent_id: &str) -> Option<Arc<SwarmCoordinator>> {
        let swarm_id = self.agent_owner.get(agent_id)?.value().clone();
        self.swarm(&swarm_id)
    }

    /// Remove a race and all of its agent routes.
    pub fn deregister(&self, swarm_id: &str, agent_ids: &[String]) {
        for id in agent_ids {
            self.agent_owner.remove(id);
        }
        self.swarms.remove(swarm_id);
    }

    /// Read-only snapshot for polling callers; `None` means unknown or
    /// expired, never an error.
    pub async fn snapshot(&self, swarm_id: &str) -> Option<SwarmSnapshot> {
        let swarm = self.swarm(swarm_id)?;
        Some(swarm.snapshot().await)
    }

    pub fn live_count(&self) -> usize {
        self.swarms.len()
    }
}
