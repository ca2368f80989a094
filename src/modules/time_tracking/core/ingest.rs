// Normalization of time-log payloads at the ingestion boundary.
//
// Purpose
// - The backend answers either with a bare array or with a paginated `{results, next}` object.
//   Both are collapsed into one EntryPage here; nothing downstream sees the union.
//
// Responsibilities
// - Decode each record on its own so a single malformed record is skipped, not fatal.

use crate::modules::time_tracking::core::time_entry::TimeEntry;
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPage {
    pub entries: Vec<TimeEntry>,
    pub next: Option<String>,
    pub skipped: usize,
}

impl EntryPage {
    pub fn from_json(payload: Value) -> Self {
        let (records, next) = match payload {
            Value::Array(records) => (records, None),
            Value::Object(mut object) => {
                let records = match object.remove("results") {
                    Some(Value::Array(records)) => records,
                    _ => Vec::new(),
                };
                let next = match object.remove("next") {
                    Some(Value::String(next)) if !next.is_empty() => Some(next),
                    _ => None,
                };
                (records, next)
            }
            _ => (Vec::new(), None),
        };

        let mut entries = Vec::with_capacity(records.len());
        let mut skipped = 0;
        for record in records {
            match serde_json::from_value::<TimeEntry>(record) {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    skipped += 1;
                    warn!(%error, "skipping malformed time entry");
                }
            }
        }

        Self {
            entries,
            next,
            skipped,
        }
    }
}
