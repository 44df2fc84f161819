//! Appointment slot times — minutes since midnight
//!
//! Provider receptionists quote times as 12-hour strings ("9:30 AM").
//! `SlotTime` keeps the value as minutes since midnight so earliest-slot
//! comparisons are plain integer ordering, and round-trips back to the
//! 12-hour form for events and catalog files.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SwarmError;

/// Time of day as minutes since midnight (0..1440)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(u16);

impl SlotTime {
    pub const MIDNIGHT: SlotTime = SlotTime(0);

    /// Construct from minutes since midnight. Values ≥ 24h are rejected.
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < 24 * 60).then_some(Self(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Lenient parse of "9:30 AM", "09:30 pm", "9 AM", or 24-hour "14:00".
    ///
    /// Returns `None` for anything unrecognizable; malformed inputs are a
    /// documented-default concern for callers, never a race failure.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase().replace('.', "");
        let mut parts = normalized.split_whitespace();
        let time_part = parts.next()?;
        let period = parts.next();

        let (hour, minute): (u16, u16) = match time_part.split_once(':') {
            Some((h, m)) => (h.parse().ok()?, m.parse().ok()?),
            None => (time_part.parse().ok()?, 0),
        };
        if minute > 59 {
            return None;
        }

        let hour = match period {
            Some("PM") if hour != 12 => hour.checked_add(12)?,
            Some("AM") if hour == 12 => 0,
            Some("AM") | Some("PM") | None => hour,
            Some(_) => return None,
        };
        if hour > 23 {
            return None;
        }

        Some(Self(hour * 60 + minute))
    }
}

impl FromStr for SlotTime {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s).ok_or_else(|| SwarmError::InvalidSlot(s.to_string()))
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hour24 = self.0 / 60;
        let minute = self.0 % 60;
        let (hour12, period) = match hour24 {
            0 => (12, "AM"),
            1..=11 => (hour24, "AM"),
            12 => (12, "PM"),
            _ => (hour24 - 12, "PM"),
        };
        write!(f, "{}:{:02} {}", hour12, minute, period)
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|_| {
            D::Error::custom(format!("invalid slot time: {raw:?}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_12_hour_times() {
        assert_eq!(SlotTime::parse_lenient("9:30 AM"), SlotTime::from_minutes(570));
        assert_eq!(SlotTime::parse_lenient("12:00 AM"), SlotTime::from_minutes(0));
        assert_eq!(SlotTime::parse_lenient("12:30 PM"), SlotTime::from_minutes(750));
        assert_eq!(SlotTime::parse_lenient("4:30 pm"), SlotTime::from_minutes(990));
        assert_eq!(SlotTime::parse_lenient("  11:45 A.M. "), SlotTime::from_minutes(705));
    }

    #[test]
    fn test_parse_bare_hour_and_24_hour() {
        assert_eq!(SlotTime::parse_lenient("9 AM"), SlotTime::from_minutes(540));
        assert_eq!(SlotTime::parse_lenient("14:00"), SlotTime::from_minutes(840));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(SlotTime::parse_lenient(""), None);
        assert_eq!(SlotTime::parse_lenient("soon-ish"), None);
        assert_eq!(SlotTime::parse_lenient("25:00"), None);
        assert_eq!(SlotTime::parse_lenient("9:75 AM"), None);
    }

    #[test]
    fn test_display_round_trip() {
        for raw in ["8:00 AM", "9:30 AM", "12:00 PM", "12:15 AM", "4:30 PM"] {
            let slot: SlotTime = raw.parse().expect("parses");
            assert_eq!(slot.to_string(), raw);
        }
    }

    #[test]
    fn test_ordering_is_minutes_since_midnight() {
        let nine: SlotTime = "9:00 AM".parse().expect("parses");
        let ten: SlotTime = "10:00 AM".parse().expect("parses");
        let one_pm: SlotTime = "1:00 PM".parse().expect("parses");
        assert!(nine < ten);
        assert!(ten < one_pm);
    }

    #[test]
    fn test_serde_string_repr() {
        let slot: SlotTime = "9:30 AM".parse().expect("parses");
        let json = serde_json::to_string(&slot).expect("serializes");
        assert_eq!(json, "\"9:30 AM\"");
        let back: SlotTime = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, slot);
    }
}
