//! Swarm coordinator — one race among concurrent caller agents
//!
//! `start()` registers the race, emits a start event, and spawns one
//! tokio task per candidate. Each worker walks its agent through the
//! dial → negotiate → resolve stages; external confirmations feed the
//! same completion path via `report_external_result`. Every terminal
//! transition increments the completion counter under the per-race
//! mutex, and the arbitration pass (winner + ranked shortlist + final
//! event + deregistration) runs exactly once, when the counter reaches
//! the candidate count.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::time::{sleep, Duration};
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::ProviderRecord;
use crate::config::SwarmConfig;
use crate::domain::{AgentStatus, CandidateAgent, SlotTime};
use crate::error::{Result, SwarmError};
use crate::scoring::{self, RankedEntry, ScoreWeights, WeightOverrides};
use crate::webhook::{normalize_slot_time, CallConfirmation, CallOutcome};

use super::events::{now_ms, EventEmitter, SwarmEvent, WinnerSummary};
use super::registry::SwarmRegistry;
use super::simulation::SimulationPlan;

/// Mutable race state. Everything the completion accounting touches
/// lives behind one mutex so the increment-and-compare, the completion
/// flag, and the arbitration body are a single critical section.
#[derive(Debug)]
struct SwarmInner {
    agents: Vec<CandidateAgent>,
    winner: Option<String>,
    shortlist: Vec<RankedEntry>,
    completed: bool,
    completed_count: usize,
}

impl SwarmInner {
    fn agent_mut(&mut self, agent_id: &str) -> Option<&mut CandidateAgent> {
        self.agents.iter_mut().find(|a| a.id == agent_id)
    }
}

/// Read-only view of a race for polling callers.
#[derive(Debug, Clone, Serialize)]
pub struct SwarmSnapshot {
    pub swarm_id: String,
    pub completed: bool,
    pub agents: Vec<CandidateAgent>,
    pub winner: Option<WinnerSummary>,
    pub shortlist: Vec<RankedEntry>,
}

pub struct SwarmCoordinator {
    swarm_id: String,
    registry: Arc<SwarmRegistry>,
    emitter: EventEmitter,
    config: SwarmConfig,
    weights: ScoreWeights,
    done_tx: watch::Sender<bool>,
    inner: Mutex<SwarmInner>,
}

impl std::fmt::Debug for SwarmCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwarmCoordinator")
            .field("swarm_id", &self.swarm_id)
            .finish_non_exhaustive()
    }
}

impl SwarmCoordinator {
    /// Build agent records from a catalog snapshot, register the race,
    /// emit the start event, and launch one worker per candidate.
    /// Returns immediately; the race runs in the background.
    pub fn start(
        registry: Arc<SwarmRegistry>,
        records: Vec<ProviderRecord>,
        overrides: Option<WeightOverrides>,
        plan: SimulationPlan,
        config: SwarmConfig,
        emitter: EventEmitter,
    ) -> Result<Arc<Self>> {
        if records.is_empty() {
            return Err(SwarmError::Validation(
                "a race requires at least one candidate".to_string(),
            ));
        }
        let cap = config.max_agents.max(1);
        let records: Vec<ProviderRecord> = records.into_iter().take(cap).collect();

        let swarm_id = format!("swarm-{}", &Uuid::new_v4().simple().to_string()[..12]);
        let agents: Vec<CandidateAgent> =
            records.iter().map(CandidateAgent::from_record).collect();
        let agent_ids: Vec<String> = agents.iter().map(|a| a.id.clone()).collect();

        let (done_tx, _) = watch::channel(false);
        let coordinator = Arc::new(Self {
            swarm_id: swarm_id.clone(),
            registry: registry.clone(),
            emitter,
            config,
            weights: ScoreWeights::default().with_overrides(overrides),
            done_tx,
            inner: Mutex::new(SwarmInner {
                agents: agents.clone(),
                winner: None,
                shortlist: Vec::new(),
                completed: false,
                completed_count: 0,
            }),
        });

        registry.register(coordinator.clone(), &agent_ids);

        coordinator.emitter.emit(SwarmEvent::Started {
            swarm_id: swarm_id.clone(),
            agents: agents.clone(),
            timestamp_ms: now_ms(),
        });
        info!(swarm_id = %swarm_id, agents = agents.len(), "race started");

        for agent in agents {
            let slots = plan.slots_for(&agent.id);
            let worker = coordinator.clone();
            tokio::spawn(async move {
                worker
                    .run_agent(agent.id, agent.name, slots, agent.call_ready)
                    .await;
            });
        }

        Ok(coordinator)
    }

    pub fn swarm_id(&self) -> &str {
        &self.swarm_id
    }

    /// Block until the arbitration pass has run.
    pub async fn wait_complete(&self) {
        let mut rx = self.done_tx.subscribe();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
    }

    pub async fn snapshot(&self) -> SwarmSnapshot {
        let inner = self.inner.lock().await;
        SwarmSnapshot {
            swarm_id: self.swarm_id.clone(),
            completed: inner.completed,
            agents: inner.agents.clone(),
            winner: Self::winner_summary(&inner),
            shortlist: inner.shortlist.clone(),
        }
    }

    /// Feed an externally delivered confirmation into the same
    /// completion-accounting path as internal workers. Unknown or
    /// already-terminal agents are a no-op.
    pub async fn report_external_result(&self, agent_id: &str, confirmation: &CallConfirmation) {
        let proposed = confirmation
            .proposed_slot
            .as_deref()
            .and_then(normalize_slot_time);
        debug!(
            swarm_id = %self.swarm_id,
            %agent_id,
            outcome = ?confirmation.outcome,
            slot = ?proposed.map(|s| s.to_string()),
            "external confirmation received"
        );
        self.finish_agent(agent_id, proposed, confirmation.outcome)
            .await;
    }

    /// One simulated caller: dial → negotiate → resolve, with staged
    /// delays. Stage magnitudes are policy; the ordering is contract.
    async fn run_agent(
        self: Arc<Self>,
        agent_id: String,
        name: String,
        slots: Vec<SlotTime>,
        call_ready: bool,
    ) {
        // rng is not Send; pick the negotiation parameters before awaiting
        let (total_ms, slot) = {
            let mut rng = rand::thread_rng();
            let jitter = if self.config.stage_jitter_ms > 0 {
                rng.gen_range(0..=self.config.stage_jitter_ms)
            } else {
                0
            };
            (
                self.config.stage_delay_ms.saturating_add(jitter),
                slots.choose(&mut rng).copied(),
            )
        };
        let dial_ms = total_ms * 3 / 10;
        let stage_ms = total_ms * 35 / 100;

        sleep(Duration::from_millis(dial_ms)).await;
        self.transition(
            &agent_id,
            AgentStatus::Calling,
            None,
            format!("{name}: dialing provider"),
        )
        .await;

        if call_ready && !self.config.demo_mode {
            // Live call in flight; the webhook terminalizes this agent.
            // Delivery is unbounded — the race waits.
            debug!(swarm_id = %self.swarm_id, %agent_id, "awaiting live confirmation webhook");
            return;
        }

        let Some(slot) = slot else {
            self.finish_agent(&agent_id, None, CallOutcome::Unreachable)
                .await;
            return;
        };

        sleep(Duration::from_millis(stage_ms)).await;
        self.transition(
            &agent_id,
            AgentStatus::Negotiating,
            Some(slot),
            format!("{name}: negotiating, offered {slot}"),
        )
        .await;

        sleep(Duration::from_millis(stage_ms)).await;
        self.finish_agent(&agent_id, Some(slot), CallOutcome::Accepted)
            .await;
    }

    /// Intermediate (non-terminal) transition. No-op once the agent is
    /// terminal, so a worker racing an external confirmation for the
    /// same agent cannot resurrect it.
    async fn transition(
        &self,
        agent_id: &str,
        status: AgentStatus,
        slot: Option<SlotTime>,
        message: String,
    ) {
        let mut inner = self.inner.lock().await;
        let Some(agent) = inner.agent_mut(agent_id) else {
            return;
        };
        if agent.status.is_terminal() {
            return;
        }
        agent.status = status;
        if slot.is_some() {
            agent.slot = slot;
        }
        let slot = agent.slot;

        // Emitted while the race mutex is held so the event stream
        // preserves state order; a terminal transition for the same
        // agent on another task must not overtake this update.
        self.emitter.emit(SwarmEvent::AgentUpdate {
            swarm_id: self.swarm_id.clone(),
            agent_id: agent_id.to_string(),
            status,
            slot,
            message,
        });
    }

    /// Terminal transition plus completion accounting. The entire
    /// check-counter / set-flag / arbitrate sequence runs under the
    /// race mutex so the arbitration body executes exactly once no
    /// matter how terminal transitions interleave.
    async fn finish_agent(
        &self,
        agent_id: &str,
        proposed: Option<SlotTime>,
        outcome: CallOutcome,
    ) {
        let floor = self.config.slot_floor;
        let mut inner = self.inner.lock().await;

        let already_completed = inner.completed;
        let Some(agent) = inner.agent_mut(agent_id) else {
            return;
        };
        if agent.status.is_terminal() {
            return;
        }

        let name = agent.name.clone();
        let (status, message) = if already_completed {
            (
                AgentStatus::Superseded,
                format!("{name}: superseded (winner already selected)"),
            )
        } else {
            match (outcome, proposed) {
                (CallOutcome::Accepted, Some(slot)) if slot >= floor => (
                    AgentStatus::Secured,
                    format!("{name}: slot {slot} accepted"),
                ),
                (CallOutcome::Accepted, Some(slot)) => (
                    AgentStatus::Declined,
                    format!("{name}: slot {slot} rejected (before {floor})"),
                ),
                (CallOutcome::Accepted, None) => (
                    AgentStatus::Declined,
                    format!("{name}: no valid slot offered"),
                ),
                (CallOutcome::Declined, _) => {
                    (AgentStatus::Declined, format!("{name}: provider declined"))
                }
                (CallOutcome::Unreachable, _) => (
                    AgentStatus::Declined,
                    format!("{name}: provider unreachable"),
                ),
            }
        };

        agent.status = status;
        if proposed.is_some() {
            agent.slot = proposed;
        }
        let slot = agent.slot;

        self.emitter.emit(SwarmEvent::AgentUpdate {
            swarm_id: self.swarm_id.clone(),
            agent_id: agent_id.to_string(),
            status,
            slot,
            message,
        });

        inner.completed_count += 1;
        if inner.completed_count >= inner.agents.len() && !inner.completed {
            inner.completed = true;
            self.arbitrate(&mut inner);
            let agent_ids: Vec<String> = inner.agents.iter().map(|a| a.id.clone()).collect();
            drop(inner);
            self.registry.deregister(&self.swarm_id, &agent_ids);
            self.done_tx.send_replace(true);
        }
    }

    /// The single arbitration pass: ranked shortlist by composite score,
    /// winner by earliest secured slot, losing secured agents demoted to
    /// superseded, one final event.
    fn arbitrate(&self, inner: &mut SwarmInner) {
        // Shortlist first: it ranks everything that reached secured,
        // including agents about to be demoted.
        inner.shortlist = scoring::rank_secured(&inner.agents, &self.weights);

        let winner = scoring::earliest_secured(&inner.agents)
            .map(|a| (a.id.clone(), a.name.clone(), a.slot));

        if let Some((winner_id, winner_name, winner_slot)) = &winner {
            for agent in inner.agents.iter_mut() {
                if agent.id != *winner_id && agent.status == AgentStatus::Secured {
                    agent.status = AgentStatus::Superseded;
                    self.emitter.emit(SwarmEvent::AgentUpdate {
                        swarm_id: self.swarm_id.clone(),
                        agent_id: agent.id.clone(),
                        status: agent.status,
                        slot: agent.slot,
                        message: format!("{}: superseded (not the earliest slot)", agent.name),
                    });
                }
            }
            inner.winner = Some(winner_id.clone());
            self.emitter.emit(SwarmEvent::WinnerSelected {
                swarm_id: self.swarm_id.clone(),
                agent_id: winner_id.clone(),
                provider_name: winner_name.clone(),
                slot: *winner_slot,
            });
            info!(
                swarm_id = %self.swarm_id,
                winner = %winner_id,
                slot = ?winner_slot.map(|s| s.to_string()),
                "winner selected"
            );
        } else {
            info!(swarm_id = %self.swarm_id, "race completed without a winner");
        }

        self.emitter.emit(SwarmEvent::Completed {
            swarm_id: self.swarm_id.clone(),
            winner: winner.map(|(agent_id, provider_name, slot)| WinnerSummary {
                agent_id,
                provider_name,
                slot,
            }),
            agents: inner.agents.clone(),
            shortlist: inner.shortlist.clone(),
        });
    }

    fn winner_summary(inner: &SwarmInner) -> Option<WinnerSummary> {
        let winner_id = inner.winner.as_ref()?;
        let agent = inner.agents.iter().find(|a| &a.id == winner_id)?;
        Some(WinnerSummary {
            agent_id: agent.id.clone(),
            provider_name: agent.name.clone(),
            slot: agent.slot,
        })
    }
}
