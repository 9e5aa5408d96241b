//! Recorded query execution events
//!
//! A [`QueryEvent`] is immutable once created: the store hands out copies,
//! never references into its own buffers.

use serde::{Deserialize, Deserializer, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// One recorded query execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEvent {
    /// Capture time in Unix epoch milliseconds (display only)
    #[serde(rename = "date")]
    recorded_at: u64,
    /// The executed query text (opaque, never parsed)
    query: String,
    /// Execution time in milliseconds, always finite and >= 0
    #[serde(rename = "executionTime", deserialize_with = "deserialize_duration")]
    execution_time_ms: f64,
}

impl QueryEvent {
    /// Create an event stamped with the current wall-clock time
    pub fn new(query: impl Into<String>, execution_time_ms: f64) -> Self {
        Self::with_timestamp(query, execution_time_ms, now_millis())
    }

    /// Create an event with an explicit capture timestamp
    pub fn with_timestamp(query: impl Into<String>, execution_time_ms: f64, recorded_at: u64) -> Self {
        Self {
            recorded_at,
            query: query.into(),
            execution_time_ms: sanitize_duration(execution_time_ms),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn execution_time_ms(&self) -> f64 {
        self.execution_time_ms
    }

    pub fn recorded_at(&self) -> u64 {
        self.recorded_at
    }
}

/// Clamp a reported duration into the valid range.
///
/// Negative, NaN and infinite values become `0.0`.
pub fn sanitize_duration(ms: f64) -> f64 {
    if ms.is_finite() && ms > 0.0 {
        ms
    } else {
        0.0
    }
}

fn deserialize_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    f64::deserialize(deserializer).map(sanitize_duration)
}

/// Current Unix time in milliseconds (0 if the clock is before the epoch)
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
