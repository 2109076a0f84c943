//! Audit records for executed operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use ulid::Ulid;

/// One executed operation, as written to the activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Sortable by creation time
    pub id: Ulid,
    pub timestamp: DateTime<Utc>,
    /// `"{verb} {noun}"`, e.g. "move card"
    pub op: String,
    /// The operation as submitted
    pub input: Value,
    /// The patch batch produced, or `{"error": ...}`
    pub output: Value,
    /// Acting user, filled in by the processor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub duration_ms: u64,
}

impl LogEntry {
    /// Record an operation that ran for `elapsed`
    pub fn new(op: impl Into<String>, input: Value, output: Value, elapsed: Duration) -> Self {
        Self {
            id: Ulid::new(),
            timestamp: Utc::now(),
            op: op.into(),
            input,
            output,
            actor: None,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// The recorded error message, if the operation failed
    pub fn error(&self) -> Option<&str> {
        self.output.get("error").and_then(Value::as_str)
    }

    pub fn is_failure(&self) -> bool {
        self.error().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_actor_skipped_when_absent() {
        let entry = LogEntry::new("add card", json!({"title": "x"}), json!([]), Duration::from_millis(3));
        let text = serde_json::to_string(&entry).unwrap();
        assert!(!text.contains("actor"));
        assert_eq!(entry.duration_ms, 3);

        let entry = entry.with_actor("alice");
        let back: LogEntry = serde_json::from_str(&serde_json::to_string(&entry).unwrap()).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_failure_carries_message() {
        let ok = LogEntry::new("add card", json!({}), json!([]), Duration::ZERO);
        let failed = LogEntry::new("add card", json!({}), json!({"error": "nope"}), Duration::ZERO);
        assert!(!ok.is_failure());
        assert_eq!(failed.error(), Some("nope"));
    }
}
