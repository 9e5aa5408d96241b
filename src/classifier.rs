//! Slow-query classification
//!
//! Decides whether an execution is worth a diagnostic line. The rule is a
//! plain threshold test, with debug mode forcing every event through.

use serde::Serialize;
use std::fmt;

/// Severity tag attached to an emitted diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Debug mode is on; every event is reported
    Debug,
    /// The execution crossed the slow-query threshold
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Warning => "WARNING",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Silent,
    Warn(Severity),
}

impl Verdict {
    pub fn is_warn(&self) -> bool {
        matches!(self, Verdict::Warn(_))
    }
}

/// Classify an execution time against the configured threshold
///
/// Returns `Warn` when `execution_time_ms >= slow_threshold_ms` or when debug
/// mode is enabled. Debug mode wins the severity tag even for slow queries.
pub fn classify(execution_time_ms: f64, debug_enabled: bool, slow_threshold_ms: f64) -> Verdict {
    if debug_enabled {
        Verdict::Warn(Severity::Debug)
    } else if execution_time_ms >= slow_threshold_ms {
        Verdict::Warn(Severity::Warning)
    } else {
        Verdict::Silent
    }
}

/// A formatted diagnostic for the log sink. Never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub caller: String,
    pub execution_time_ms: f64,
    pub query: String,
    /// Call parameters serialized to JSON
    pub parameters: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} took {}ms to execute a query! {} {}",
            self.severity, self.caller, self.execution_time_ms, self.query, self.parameters
        )
    }
}

/// Classify an execution and build its diagnostic if it is noteworthy
pub fn diagnose<P: Serialize + ?Sized>(
    caller: &str,
    query: &str,
    execution_time_ms: f64,
    parameters: &P,
    debug_enabled: bool,
    slow_threshold_ms: f64,
) -> Option<Diagnostic> {
    match classify(execution_time_ms, debug_enabled, slow_threshold_ms) {
        Verdict::Silent => None,
        Verdict::Warn(severity) => Some(Diagnostic {
            severity,
            caller: caller.to_string(),
            execution_time_ms,
            query: query.to_string(),
            parameters: render_parameters(parameters),
        }),
    }
}

/// Serialize call parameters for display; unserializable values render as `null`
fn render_parameters<P: Serialize + ?Sized>(parameters: &P) -> String {
    serde_json::to_string(parameters).unwrap_or_else(|_| "null".to_string())
}
