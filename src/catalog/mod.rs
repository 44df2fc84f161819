//! Provider catalog loading
//!
//! Reads a provider directory JSON file, filters by normalized service
//! type, and caps the result. Falls back to a small built-in catalog so
//! a missing or malformed file degrades to a working demo instead of a
//! failed race.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Service type assumed for untyped catalog records and empty queries.
pub const DEFAULT_SERVICE_TYPE: &str = "dentist";

/// One provider record as consumed at race start. The core never
/// re-reads the catalog mid-race.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub distance_miles: Option<f64>,
    #[serde(default)]
    pub live_call_ready: bool,
    #[serde(default)]
    pub service_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    providers: Vec<ProviderRecord>,
}

/// Load providers for a service type, capped at `max_count`.
///
/// Missing file, unreadable file, or an empty filter result all fall
/// back to the built-in default catalog.
pub fn load_providers(
    path: Option<&Path>,
    service_type: &str,
    max_count: usize,
) -> Vec<ProviderRecord> {
    let max_count = max_count.max(1);

    if let Some(path) = path {
        match read_directory(path) {
            Ok(all) => {
                let wanted = normalize_service_type(service_type);
                let filtered: Vec<ProviderRecord> = all
                    .into_iter()
                    .filter(|p| {
                        p.service_type
                            .as_deref()
                            .map(|s| s.eq_ignore_ascii_case(&wanted))
                            .unwrap_or(wanted == DEFAULT_SERVICE_TYPE)
                    })
                    .take(max_count)
                    .collect();
                if !filtered.is_empty() {
                    return filtered;
                }
                warn!(%service_type, path = %path.display(), "no catalog entries matched; using defaults");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read provider directory; using defaults");
            }
        }
    }

    default_providers().into_iter().take(max_count).collect()
}

fn read_directory(path: &Path) -> Result<Vec<ProviderRecord>> {
    let raw = fs::read_to_string(path)?;
    let file: DirectoryFile = serde_json::from_str(&raw)?;
    Ok(file.providers)
}

/// Map UI-facing service names onto catalog service types.
pub fn normalize_service_type(raw: &str) -> String {
    let s = raw.trim().to_ascii_lowercase();
    match s.as_str() {
        "" => DEFAULT_SERVICE_TYPE.to_string(),
        "haircut" | "hair" | "salon" => "salon".to_string(),
        "auto" | "car" | "auto_repair" => "auto_repair".to_string(),
        other => other.to_string(),
    }
}

/// Built-in demo catalog used when no directory file is available.
pub fn default_providers() -> Vec<ProviderRecord> {
    let entries = [
        ("agent-1", "Harbor Dental Group", 4.8, 1.2, true),
        ("agent-2", "Lakeside Family Dentistry", 4.5, 3.4, false),
        ("agent-3", "Summit Smiles", 4.2, 5.1, false),
        ("agent-4", "Cedar Street Dental", 4.9, 7.8, false),
        ("agent-5", "Northgate Dental Care", 3.9, 2.6, false),
    ];
    entries
        .iter()
        .map(|(id, name, rating, distance, ready)| ProviderRecord {
            id: (*id).to_string(),
            name: (*name).to_string(),
            rating: Some(*rating),
            distance_miles: Some(*distance),
            live_call_ready: *ready,
            service_type: Some(DEFAULT_SERVICE_TYPE.to_string()),
        })
        .collect()
}
