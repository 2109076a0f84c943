//! Execution result types for operations

use crate::LogEntry;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Display;
use std::time::Instant;

/// Result of executing an operation
///
/// Distinguishes between:
/// - Logged: Operations that mutate state and should be audited
/// - Unlogged: Read-only operations with no side effects
/// - Failed: Errors (optionally logged)
#[derive(Debug)]
pub enum ExecutionResult<T, E> {
    /// Operation succeeded and should be logged
    Logged { value: T, log_entry: LogEntry },
    /// Operation succeeded but no logging needed (read-only)
    Unlogged { value: T },
    /// Operation failed
    Failed {
        error: E,
        log_entry: Option<LogEntry>,
    },
}

impl<T, E> ExecutionResult<T, E>
where
    T: Serialize,
    E: Display,
{
    /// Wrap the outcome of a mutating operation, recording a log entry
    /// for both success and failure. The processor attributes the actor.
    pub fn logged(
        op: impl Into<String>,
        input: Value,
        started: Instant,
        result: Result<T, E>,
    ) -> Self {
        let elapsed = started.elapsed();
        match result {
            Ok(value) => {
                let output = serde_json::to_value(&value).unwrap_or(Value::Null);
                Self::Logged {
                    value,
                    log_entry: LogEntry::new(op, input, output, elapsed),
                }
            }
            Err(error) => {
                let output = json!({ "error": error.to_string() });
                Self::Failed {
                    log_entry: Some(LogEntry::new(op, input, output, elapsed)),
                    error,
                }
            }
        }
    }
}

impl<T, E> ExecutionResult<T, E> {
    /// Wrap the outcome of a read-only operation
    pub fn unlogged(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Unlogged { value },
            Err(error) => Self::Failed {
                error,
                log_entry: None,
            },
        }
    }

    /// Extract the result (Ok or Err)
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Logged { value, .. } => Ok(value),
            Self::Unlogged { value } => Ok(value),
            Self::Failed { error, .. } => Err(error),
        }
    }

    /// Get the value and log entry separately
    pub fn split(self) -> (Result<T, E>, Option<LogEntry>) {
        match self {
            Self::Logged { value, log_entry } => (Ok(value), Some(log_entry)),
            Self::Unlogged { value } => (Ok(value), None),
            Self::Failed { error, log_entry } => (Err(error), log_entry),
        }
    }

    /// Check if this should be logged
    pub fn should_log(&self) -> bool {
        matches!(
            self,
            Self::Logged { .. }
                | Self::Failed {
                    log_entry: Some(_),
                    ..
                }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logged_success() {
        let result: ExecutionResult<Vec<u32>, String> = ExecutionResult::logged(
            "add card",
            json!({"title": "x"}),
            Instant::now(),
            Ok(vec![1, 2]),
        );
        assert!(result.should_log());
        let (value, entry) = result.split();
        assert_eq!(value.unwrap(), vec![1, 2]);
        let entry = entry.unwrap();
        assert_eq!(entry.output, json!([1, 2]));
        assert_eq!(entry.op, "add card");
        assert!(entry.actor.is_none());
    }

    #[test]
    fn test_logged_failure_keeps_entry() {
        let result: ExecutionResult<Vec<u32>, String> = ExecutionResult::logged(
            "add card",
            json!({}),
            Instant::now(),
            Err("locked".into()),
        );
        assert!(result.should_log());
        let (value, entry) = result.split();
        assert_eq!(value.unwrap_err(), "locked");
        assert!(entry.unwrap().is_failure());
    }

    #[test]
    fn test_unlogged() {
        let ok: ExecutionResult<u32, String> = ExecutionResult::unlogged(Ok(7));
        assert!(!ok.should_log());
        assert_eq!(ok.into_result().unwrap(), 7);

        let err: ExecutionResult<u32, String> = ExecutionResult::unlogged(Err("gone".into()));
        assert!(!err.should_log());
        assert!(err.into_result().is_err());
    }
}
