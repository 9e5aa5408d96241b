//! Summary statistics over the event store
//!
//! `summarize` is the straight linear scan the monitoring view opens with.
//! `caller_stats` adds a latency breakdown for a single caller, computed with
//! Trueno for the vector reductions.

use crate::store::EventStore;

/// Totals across every caller in the store
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Caller identities in first-seen order
    pub callers: Vec<String>,
    pub total_events: usize,
    pub total_execution_time_ms: f64,
}

/// Latency breakdown for one caller
#[derive(Debug, Clone, PartialEq)]
pub struct CallerStats {
    pub caller: String,
    pub count: usize,
    pub total_ms: f64,
    pub mean: f32,
    pub stddev: f32,
    pub min: f32,
    pub max: f32,
    pub p50: f32,
    pub p95: f32,
    pub p99: f32,
}

/// Aggregate event count, total execution time and the caller set
pub fn summarize(store: &EventStore) -> Summary {
    let mut callers = Vec::new();
    let mut total_events = 0;
    let mut total_execution_time_ms = 0.0;

    store.for_each_caller(|caller, events| {
        callers.push(caller.to_string());
        total_events += events.len();
        total_execution_time_ms += events.iter().map(|e| e.execution_time_ms()).sum::<f64>();
    });

    Summary {
        callers,
        total_events,
        total_execution_time_ms,
    }
}

/// Latency statistics for `caller`, or `None` if it has no events
pub fn caller_stats(store: &EventStore, caller: &str) -> Option<CallerStats> {
    store.with_events(caller, |events| {
        if events.is_empty() {
            return None;
        }

        let total_ms: f64 = events.iter().map(|e| e.execution_time_ms()).sum();
        let durations: Vec<f32> = events.iter().map(|e| e.execution_time_ms() as f32).collect();

        let v = trueno::Vector::from_slice(&durations);
        let mean = v.mean().unwrap_or(0.0);
        let stddev = v.stddev().unwrap_or(0.0);
        let min = v.min().unwrap_or(0.0);
        let max = v.max().unwrap_or(0.0);

        let mut sorted = durations;
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(CallerStats {
            caller: caller.to_string(),
            count: events.len(),
            total_ms,
            mean,
            stddev,
            min,
            max,
            p50: percentile(&sorted, 50.0),
            p95: percentile(&sorted, 95.0),
            p99: percentile(&sorted, 99.0),
        })
    })
}

/// Linear-interpolated percentile over sorted data
fn percentile(sorted_data: &[f32], percentile: f32) -> f32 {
    if sorted_data.is_empty() {
        return 0.0;
    }
    if sorted_data.len() == 1 {
        return sorted_data[0];
    }

    let index = (percentile / 100.0) * (sorted_data.len() - 1) as f32;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted_data[lower]
    } else {
        let weight = index - lower as f32;
        sorted_data[lower] * (1.0 - weight) + sorted_data[upper] * weight
    }
}
