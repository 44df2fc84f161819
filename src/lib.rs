pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod scoring;
pub mod swarm;
pub mod webhook;

pub use catalog::ProviderRecord;
pub use config::{AppConfig, SwarmConfig};
pub use domain::{AgentStatus, CandidateAgent, SlotTime};
pub use error::{Result, SwarmError};
pub use scoring::{RankedEntry, ScoreWeights, WeightOverrides};
pub use swarm::{
    EventEmitter, SimulationPlan, SwarmCoordinator, SwarmEvent, SwarmRegistry, SwarmSnapshot,
    WinnerSummary,
};
pub use webhook::{route_confirmation, CallConfirmation, CallOutcome};
