//! Booking race orchestration
//!
//! A swarm is one concurrent competition among caller agents for a
//! single booking outcome: the coordinator drives per-agent state
//! machines, the registry routes late webhook confirmations back to the
//! owning race, and the emitter publishes transitions to subscribers.

pub mod coordinator;
pub mod events;
pub mod registry;
pub mod simulation;

pub use coordinator::{SwarmCoordinator, SwarmSnapshot};
pub use events::{EventEmitter, SwarmEvent, WinnerSummary};
pub use registry::SwarmRegistry;
pub use simulation::{SimulationPlan, MOCK_SLOTS};
