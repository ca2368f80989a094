// TimeEntry is one punch session as reported by the backend.
//
// Purpose
// - Hold the record and the overlap math every aggregate is built from.
//
// Boundaries
// - No input or output. The stored `duration` of a closed session is authoritative and is never
//   recomputed from the timestamps; it is only prorated when the session straddles a window.
// - Untrusted input degrades to a zero contribution instead of an error.

use crate::shared::core::calendar::TimeWindow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    pub clock_in: DateTime<Utc>,
    #[serde(default)]
    pub clock_out: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_seconds")]
    pub duration: Option<i64>,
    #[serde(default)]
    pub is_active: bool,
}

impl TimeEntry {
    /// An open session has no clock-out and is flagged active by the backend.
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none() && self.is_active
    }

    /// End of the session span, with `now` standing in for an open session.
    pub fn span_end(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.clock_out {
            Some(clock_out) => Some(clock_out),
            None if self.is_active => Some(now),
            None => None,
        }
    }

    /// Seconds of this session attributed to `window`.
    pub fn overlap_seconds(&self, window: &TimeWindow, now: DateTime<Utc>) -> f64 {
        let Some(clock_out) = self.clock_out else {
            return if self.is_active {
                clipped_seconds(self.clock_in, now, window)
            } else {
                0.0
            };
        };

        let overlap = clipped_seconds(self.clock_in, clock_out, window);
        let Some(duration) = self.duration.filter(|d| *d > 0) else {
            return 0.0;
        };
        if overlap <= 0.0 {
            return 0.0;
        }
        if window.start <= self.clock_in && clock_out <= window.end {
            return duration as f64;
        }
        let session_seconds = seconds_between(self.clock_in, clock_out);
        if session_seconds <= 0.0 {
            return 0.0;
        }
        duration as f64 * (overlap / session_seconds)
    }

    /// Whether the session span intersects `window` for a non-zero length of time.
    pub fn touches(&self, window: &TimeWindow, now: DateTime<Utc>) -> bool {
        self.span_end(now)
            .is_some_and(|end| clipped_seconds(self.clock_in, end, window) > 0.0)
    }
}

fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 1000.0
}

fn clipped_seconds(start: DateTime<Utc>, end: DateTime<Utc>, window: &TimeWindow) -> f64 {
    let from = start.max(window.start);
    let to = end.min(window.end);
    seconds_between(from, to).max(0.0)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

pub(crate) fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

fn deserialize_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.filter(|s| s.is_finite()).map(|s| s.round() as i64))
}
