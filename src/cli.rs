//! Command-line interface for running demo races and probing the
//! scoring engine.

use std::path::Path;

use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::catalog;
use crate::config::AppConfig;
use crate::domain::SlotTime;
use crate::error::{Result, SwarmError};
use crate::scoring::{self, ScoreWeights, WeightOverrides};
use crate::swarm::{EventEmitter, SimulationPlan, SwarmCoordinator, SwarmEvent, SwarmRegistry};

#[derive(Parser)]
#[command(name = "callswarm", about = "Parallel appointment-booking race orchestrator")]
pub struct Cli {
    /// Configuration file (TOML); defaults layer with CALLSWARM_* env vars
    #[arg(short, long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one booking race against the provider catalog
    Run {
        /// Service type to search (dentist, salon, vet, ...)
        #[arg(long)]
        service_type: Option<String>,
        /// Maximum number of caller agents to spawn
        #[arg(long)]
        max_providers: Option<usize>,
        /// JSON weight overrides, e.g. '{"time":0.6,"rating":0.2,"distance":0.2}'
        #[arg(long)]
        weights: Option<String>,
    },
    /// Score a hypothetical result with the ranking engine
    Score {
        /// Slot time, e.g. "9:30 AM"
        #[arg(long)]
        slot: String,
        /// Provider rating (0-5)
        #[arg(long)]
        rating: Option<f64>,
        /// Distance in miles
        #[arg(long)]
        distance: Option<f64>,
    },
}

/// Run a single race end to end, printing every event as JSON.
pub async fn run_race(
    cfg: &AppConfig,
    service_type: Option<&str>,
    max_providers: Option<usize>,
    weights_json: Option<&str>,
) -> Result<()> {
    let overrides: Option<WeightOverrides> = match weights_json {
        Some(raw) => Some(serde_json::from_str(raw)?),
        None => None,
    };

    let service_type = service_type.unwrap_or(&cfg.catalog.service_type);
    let max_providers = max_providers.unwrap_or(cfg.swarm.max_agents);
    let providers = catalog::load_providers(
        cfg.catalog.directory_path.as_deref().map(Path::new),
        service_type,
        max_providers,
    );

    let plan = match cfg.catalog.simulation_path.as_deref() {
        Some(path) => match SimulationPlan::from_file(Path::new(path)) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(path, error = %e, "failed to load simulation plan; using mock slots");
                SimulationPlan::default()
            }
        },
        None => SimulationPlan::default(),
    };

    let registry = SwarmRegistry::new();
    let emitter = EventEmitter::new(cfg.swarm.event_buffer);
    let mut rx = emitter.subscribe();

    let swarm = SwarmCoordinator::start(
        registry,
        providers,
        overrides,
        plan,
        cfg.swarm.clone(),
        emitter,
    )?;
    let swarm_id = swarm.swarm_id().to_string();
    info!(%swarm_id, "race launched; streaming events");

    loop {
        match rx.recv().await {
            Ok(event) => {
                println!("{}", serde_json::to_string(&event)?);
                if matches!(&event, SwarmEvent::Completed { .. }) && event.swarm_id() == swarm_id {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "event subscriber lagged");
            }
            Err(RecvError::Closed) => {
                return Err(SwarmError::Internal("event channel closed".to_string()));
            }
        }
    }

    Ok(())
}

/// Evaluate the composite score for a hypothetical result.
pub fn score_result(slot: &str, rating: Option<f64>, distance: Option<f64>) -> Result<()> {
    let slot: SlotTime = slot.parse()?;
    let score = scoring::score(Some(slot), rating, distance, &ScoreWeights::default());
    println!(
        "slot={} rating={} distance={} -> score={:.4}",
        slot,
        rating.unwrap_or(scoring::DEFAULT_RATING),
        distance.unwrap_or(scoring::DEFAULT_DISTANCE_MILES),
        score
    );
    Ok(())
}
