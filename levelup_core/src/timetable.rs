//! Daily timetable lookup.

use crate::config::TimetableSlot;
use chrono::NaiveTime;

impl TimetableSlot {
    /// Whether `now` falls in `[start, end)`
    pub fn contains(&self, now: NaiveTime) -> bool {
        self.start <= now && now < self.end
    }
}

/// First slot covering `now`, if any
pub fn active_slot(slots: &[TimetableSlot], now: NaiveTime) -> Option<&TimetableSlot> {
    slots.iter().find(|slot| slot.contains(now))
}

/// `HH:MM` (de)serialization for slot boundaries
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
