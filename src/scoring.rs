//! Multi-factor result scoring and the two ranking policies
//!
//! Composite score = weighted sum of slot earliness, provider rating,
//! and distance, clamped to [0, 1]. Two distinct policies coexist by
//! design: the composite score orders the *shortlist* shown for
//! confirmation, while earliest-slot seniority picks the single
//! auto-selected *winner*. They feed different consumers and must not
//! be unified.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::{AgentStatus, CandidateAgent, SlotTime};

/// Business hours used to normalize slot earliness (08:00–17:00).
pub const BUSINESS_OPEN_MIN: u16 = 8 * 60;
pub const BUSINESS_CLOSE_MIN: u16 = 17 * 60;

/// Neutral fallbacks when a provider record carries no metadata.
pub const DEFAULT_RATING: f64 = 4.5;
pub const DEFAULT_DISTANCE_MILES: f64 = 5.0;

/// Weight vector for the composite score. Weights are not required to
/// sum to 1; the final score is clamped to at most 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub time: f64,
    pub rating: f64,
    pub distance: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            time: 0.5,
            rating: 0.3,
            distance: 0.2,
        }
    }
}

/// Caller-supplied overrides for recognized weight keys. Unrecognized
/// keys in the source JSON are ignored by deserialization.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct WeightOverrides {
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
}

impl ScoreWeights {
    pub fn with_overrides(mut self, overrides: Option<WeightOverrides>) -> Self {
        if let Some(o) = overrides {
            if let Some(time) = o.time {
                self.time = time;
            }
            if let Some(rating) = o.rating {
                self.rating = rating;
            }
            if let Some(distance) = o.distance {
                self.distance = distance;
            }
        }
        self
    }
}

/// Composite desirability score in [0, 1]. Higher is better.
///
/// - time: slot mapped linearly onto business hours, 1.0 at open and
///   0.0 at close; slots outside business hours contribute zero
/// - rating: rating / 5 (0–5 scale)
/// - distance: max(0, 1 − miles/10)
///
/// Pure and deterministic; missing rating/distance fall back to the
/// neutral defaults above.
pub fn score(
    slot: Option<SlotTime>,
    rating: Option<f64>,
    distance_miles: Option<f64>,
    weights: &ScoreWeights,
) -> f64 {
    let mut total = 0.0;

    if let Some(slot) = slot {
        let mins = slot.minutes();
        if (BUSINESS_OPEN_MIN..=BUSINESS_CLOSE_MIN).contains(&mins) {
            let span = f64::from(BUSINESS_CLOSE_MIN - BUSINESS_OPEN_MIN);
            let offset = f64::from(mins - BUSINESS_OPEN_MIN);
            total += weights.time * (1.0 - offset / span);
        }
    }

    let rating = rating.unwrap_or(DEFAULT_RATING);
    total += weights.rating * (rating / 5.0);

    let distance = distance_miles.unwrap_or(DEFAULT_DISTANCE_MILES);
    total += weights.distance * (1.0 - distance / 10.0).max(0.0);

    total.min(1.0)
}

/// One row of the ranked shortlist. Derived, recomputed fresh on every
/// arbitration pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub agent_id: String,
    pub provider_name: String,
    pub slot: Option<SlotTime>,
    pub score: f64,
    pub rating: Option<f64>,
    pub distance_miles: Option<f64>,
}

/// Winner policy: the secured candidate with the earliest slot,
/// independent of composite score. First in insertion order wins ties.
pub fn earliest_secured(agents: &[CandidateAgent]) -> Option<&CandidateAgent> {
    agents
        .iter()
        .filter(|a| a.status == AgentStatus::Secured && a.slot.is_some())
        .min_by_key(|a| a.slot)
}

/// Shortlist policy: all secured candidates sorted descending by
/// composite score, ties broken by insertion order (stable sort).
pub fn rank_secured(agents: &[CandidateAgent], weights: &ScoreWeights) -> Vec<RankedEntry> {
    let mut scored: Vec<(&CandidateAgent, f64)> = agents
        .iter()
        .filter(|a| a.status == AgentStatus::Secured && a.slot.is_some())
        .map(|a| (a, score(a.slot, a.rating, a.distance_miles, weights)))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (a, s))| RankedEntry {
            rank: i + 1,
            agent_id: a.id.clone(),
            provider_name: a.name.clone(),
            slot: a.slot,
            score: (s * 10_000.0).round() / 10_000.0,
            rating: a.rating,
            distance_miles: a.distance_miles,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secured(id: &str, slot: &str, rating: Option<f64>, distance: Option<f64>) -> CandidateAgent {
        CandidateAgent {
            id: id.to_string(),
            name: format!("Provider {id}"),
            status: AgentStatus::Secured,
            slot: SlotTime::parse_lenient(slot),
            rating,
            distance_miles: distance,
            call_ready: false,
        }
    }

    #[test]
    fn test_score_at_business_open() {
        // time 1.0, rating 4.5/5 = 0.9, distance 1 - 5/10 = 0.5
        let slot = SlotTime::parse_lenient("8:00 AM");
        let s = score(slot, Some(4.5), Some(5.0), &ScoreWeights::default());
        assert!((s - 0.87).abs() < 1e-9, "got {s}");
    }

    #[test]
    fn test_score_mid_morning() {
        // 9:30 is 90 minutes into a 540-minute window: time = 1 - 90/540
        let slot = SlotTime::parse_lenient("9:30 AM");
        let s = score(slot, Some(4.5), Some(5.0), &ScoreWeights::default());
        let expected = 0.5 * (1.0 - 90.0 / 540.0) + 0.3 * 0.9 + 0.2 * 0.5;
        assert!((s - expected).abs() < 1e-9, "got {s}, expected {expected}");
    }

    #[test]
    fn test_slot_outside_business_hours_contributes_zero() {
        let early = score(
            SlotTime::parse_lenient("7:00 AM"),
            Some(5.0),
            Some(0.0),
            &ScoreWeights::default(),
        );
        let none = score(None, Some(5.0), Some(0.0), &ScoreWeights::default());
        assert!((early - none).abs() < 1e-9);
    }

    #[test]
    fn test_far_distance_contributes_zero() {
        let far = score(None, Some(5.0), Some(25.0), &ScoreWeights::default());
        let at_limit = score(None, Some(5.0), Some(10.0), &ScoreWeights::default());
        assert!((far - at_limit).abs() < 1e-9);
        assert!((far - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_missing_metadata_uses_neutral_fallbacks() {
        let with_defaults = score(None, None, None, &ScoreWeights::default());
        let explicit = score(
            None,
            Some(DEFAULT_RATING),
            Some(DEFAULT_DISTANCE_MILES),
            &ScoreWeights::default(),
        );
        assert!((with_defaults - explicit).abs() < 1e-9);
    }

    #[test]
    fn test_score_clamped_to_one() {
        let weights = ScoreWeights {
            time: 2.0,
            rating: 2.0,
            distance: 2.0,
        };
        let s = score(SlotTime::parse_lenient("8:00 AM"), Some(5.0), Some(0.0), &weights);
        assert!((s - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_overrides_apply_partially() {
        let weights = ScoreWeights::default().with_overrides(Some(WeightOverrides {
            time: Some(0.7),
            rating: None,
            distance: None,
        }));
        assert!((weights.time - 0.7).abs() < 1e-9);
        assert!((weights.rating - 0.3).abs() < 1e-9);
        assert!((weights.distance - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_unrecognized_override_keys_ignored() {
        let overrides: WeightOverrides =
            serde_json::from_str(r#"{"time": 0.6, "charisma": 0.9}"#).expect("deserializes");
        assert_eq!(overrides.time, Some(0.6));
        assert_eq!(overrides.rating, None);
    }

    #[test]
    fn test_earliest_secured_ignores_score() {
        // b has a worse composite score but the earlier slot
        let agents = vec![
            secured("a", "10:00 AM", Some(5.0), Some(1.0)),
            secured("b", "9:30 AM", Some(3.0), Some(9.0)),
        ];
        let winner = earliest_secured(&agents).expect("has winner");
        assert_eq!(winner.id, "b");
    }

    #[test]
    fn test_earliest_secured_tie_breaks_by_insertion_order() {
        let agents = vec![
            secured("first", "10:00 AM", None, None),
            secured("second", "10:00 AM", None, None),
        ];
        assert_eq!(earliest_secured(&agents).expect("has winner").id, "first");
    }

    #[test]
    fn test_rank_secured_descending_with_stable_ties() {
        let mut twin_a = secured("twin-a", "10:00 AM", Some(4.0), Some(5.0));
        let twin_b = secured("twin-b", "10:00 AM", Some(4.0), Some(5.0));
        let best = secured("best", "8:30 AM", Some(5.0), Some(1.0));
        twin_a.name = "Twin A".to_string();

        let agents = vec![twin_a, best, twin_b];
        let ranked = rank_secured(&agents, &ScoreWeights::default());

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].agent_id, "best");
        assert_eq!(ranked[0].rank, 1);
        // equal scores keep insertion order
        assert_eq!(ranked[1].agent_id, "twin-a");
        assert_eq!(ranked[2].agent_id, "twin-b");
        assert!(ranked[0].score >= ranked[1].score);
        assert!(ranked[1].score >= ranked[2].score);
    }

    #[test]
    fn test_rank_secured_skips_non_secured() {
        let mut declined = secured("declined", "9:00 AM", None, None);
        declined.status = AgentStatus::Declined;
        let agents = vec![declined, secured("ok", "10:00 AM", None, None)];
        let ranked = rank_secured(&agents, &ScoreWeights::default());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].agent_id, "ok");
    }
}
