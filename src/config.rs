use config::{Config, Environment, File};
use serde::Deserialize;

use crate::domain::SlotTime;
use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub swarm: SwarmConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Layered load: optional TOML file, then `CALLSWARM_*` environment
    /// overrides (double underscore as section separator).
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();
        builder = match path {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("callswarm").required(false)),
        };
        let cfg = builder
            .add_source(Environment::with_prefix("CALLSWARM").separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwarmConfig {
    /// Upper bound on concurrent caller agents per race
    #[serde(default = "default_max_agents")]
    pub max_agents: usize,
    /// Earliest acceptable appointment slot; earlier proposals decline
    #[serde(default = "default_slot_floor")]
    pub slot_floor: SlotTime,
    /// Base duration of one simulated negotiation in milliseconds
    #[serde(default = "default_stage_delay_ms")]
    pub stage_delay_ms: u64,
    /// Random extra duration added per worker (0 = deterministic)
    #[serde(default = "default_stage_jitter_ms")]
    pub stage_jitter_ms: u64,
    /// When true, every agent is simulated; when false, call-ready
    /// agents wait for an external confirmation webhook
    #[serde(default = "default_demo_mode")]
    pub demo_mode: bool,
    /// Broadcast channel capacity for race events
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            max_agents: default_max_agents(),
            slot_floor: default_slot_floor(),
            stage_delay_ms: default_stage_delay_ms(),
            stage_jitter_ms: default_stage_jitter_ms(),
            demo_mode: default_demo_mode(),
            event_buffer: default_event_buffer(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Provider directory JSON file; built-in defaults when unset
    #[serde(default)]
    pub directory_path: Option<String>,
    /// Per-provider simulated receptionist slot plan JSON file
    #[serde(default)]
    pub simulation_path: Option<String>,
    #[serde(default = "default_service_type")]
    pub service_type: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            directory_path: None,
            simulation_path: None,
            service_type: default_service_type(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_max_agents() -> usize {
    15
}

fn default_slot_floor() -> SlotTime {
    // 09:30 local; earlier proposals are unconditionally declined
    SlotTime::parse_lenient("9:30 AM").unwrap_or(SlotTime::MIDNIGHT)
}

fn default_stage_delay_ms() -> u64 {
    1_000
}

fn default_stage_jitter_ms() -> u64 {
    4_000
}

fn default_demo_mode() -> bool {
    true
}

fn default_event_buffer() -> usize {
    256
}

fn default_service_type() -> String {
    crate::catalog::DEFAULT_SERVICE_TYPE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
