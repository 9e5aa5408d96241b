//! End-to-end behavior of the query logger through its public API
//!
//! Covers storage order, classification, summaries, paging and the
//! UI-disabled path.

use querylog::aggregate::summarize;
use querylog::classifier::{classify, Diagnostic, Severity, Verdict};
use querylog::config::LoggerConfig;
use querylog::event::QueryEvent;
use querylog::logger::{DiagnosticSink, QueryLogger};
use querylog::pager::{page, SortField, SortSpec};
use querylog::store::EventStore;
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct RecordingSink {
    seen: Arc<Mutex<Vec<Diagnostic>>>,
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        self.seen.lock().unwrap().push(diagnostic.clone());
    }
}

fn logger_with(config: LoggerConfig) -> (QueryLogger, RecordingSink) {
    let sink = RecordingSink::default();
    let logger = QueryLogger::with_store(config, Arc::new(EventStore::new()), Box::new(sink.clone()));
    (logger, sink)
}

#[test]
fn test_appends_returned_in_order() {
    let store = EventStore::new();
    let queries: Vec<String> = (0..30).map(|i| format!("SELECT * FROM t{}", i)).collect();
    for q in &queries {
        store.append("inventory", QueryEvent::new(q.as_str(), 1.0));
    }

    let got: Vec<String> = store
        .get("inventory")
        .iter()
        .map(|e| e.query().to_string())
        .collect();
    assert_eq!(got, queries);
}

#[test]
fn test_classify_threshold_and_debug() {
    assert_eq!(classify(99.0, false, 100.0), Verdict::Silent);
    assert_eq!(classify(100.0, false, 100.0), Verdict::Warn(Severity::Warning));
    assert_eq!(classify(0.0, true, 100.0), Verdict::Warn(Severity::Debug));
}

#[test]
fn test_summary_matches_recorded_times() {
    let store = EventStore::new();
    for ms in [5.0, 10.0, 15.0] {
        store.append("es_extended", QueryEvent::new("SELECT 1", ms));
    }
    store.append("qb-core", QueryEvent::new("SELECT 2", 20.0));

    let summary = summarize(&store);
    assert_eq!(summary.total_events, 4);
    assert_eq!(summary.total_execution_time_ms, 50.0);
    assert_eq!(summary.callers.len(), 2);
    assert!(summary.callers.contains(&"es_extended".to_string()));
    assert!(summary.callers.contains(&"qb-core".to_string()));
}

#[test]
fn test_fifteen_events_span_two_pages() {
    let store = EventStore::new();
    for i in 0..15 {
        store.append("shop", QueryEvent::new(format!("SELECT {}", i), i as f64));
    }

    let first = page(&store, "shop", 0, None);
    let second = page(&store, "shop", 1, None);
    assert_eq!(first.events.len(), 12);
    assert_eq!(first.page_count, 2);
    assert_eq!(second.events.len(), 3);
    assert_eq!(second.page_count, 2);
}

#[test]
fn test_empty_caller_any_page() {
    let store = EventStore::new();
    store.append("other", QueryEvent::new("SELECT 1", 1.0));

    for idx in 0..4 {
        let p = page(&store, "missing", idx, None);
        assert!(p.events.is_empty());
        assert_eq!(p.page_count, 0);
    }
}

#[test]
fn test_descending_is_reverse_of_ascending() {
    let store = EventStore::new();
    let times = [3.0, 1.0, 3.0, 2.0, 1.0, 3.0, 0.5, 2.0];
    for (i, ms) in times.iter().enumerate() {
        store.append("shop", QueryEvent::with_timestamp(format!("q{}", i), *ms, i as u64));
    }

    let asc = page(&store, "shop", 0, Some(&SortSpec::ascending(SortField::ExecutionTime)));
    let desc = page(&store, "shop", 0, Some(&SortSpec::descending(SortField::ExecutionTime)));

    let mut reversed = asc.events.clone();
    reversed.reverse();
    assert_eq!(desc.events, reversed);

    // ties: stable ascending keeps q0, q2, q5 in order; reversal flips them
    let desc_tied: Vec<&str> = desc
        .events
        .iter()
        .filter(|e| e.execution_time_ms() == 3.0)
        .map(|e| e.query())
        .collect();
    assert_eq!(desc_tied, vec!["q5", "q2", "q0"]);
}

#[test]
fn test_reads_are_idempotent() {
    let store = EventStore::new();
    for i in 0..40 {
        store.append(&format!("c{}", i % 3), QueryEvent::new(format!("q{}", i), (i * 7 % 11) as f64));
    }
    let spec = SortSpec::descending(SortField::Query);

    assert_eq!(summarize(&store), summarize(&store));
    assert_eq!(page(&store, "c1", 0, Some(&spec)), page(&store, "c1", 0, Some(&spec)));
    assert_eq!(page(&store, "c2", 1, None), page(&store, "c2", 1, None));
}

#[test]
fn test_ui_disabled_bypasses_storage() {
    let config = LoggerConfig {
        ui_enabled: false,
        slow_query_threshold_ms: 100.0,
        ..LoggerConfig::default()
    };
    let (logger, sink) = logger_with(config);

    logger.log_query("shop", "SELECT slow", 150.0, &json!(["a"]));
    logger.log_query("shop", "SELECT fast", 5.0, &json!([]));

    assert!(logger.store().is_empty());
    assert!(page(logger.store(), "shop", 0, None).events.is_empty());
    assert_eq!(summarize(logger.store()).total_events, 0);

    let seen = sink.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].severity, Severity::Warning);
    assert_eq!(seen[0].parameters, r#"["a"]"#);
}

#[test]
fn test_debug_mode_reports_every_query() {
    let config = LoggerConfig {
        debug: true,
        ..LoggerConfig::default()
    };
    let (logger, sink) = logger_with(config);

    for i in 0..5 {
        logger.log_query("shop", "SELECT 1", i as f64, &json!([]));
    }

    let seen = sink.seen.lock().unwrap();
    assert_eq!(seen.len(), 5);
    assert!(seen.iter().all(|d| d.severity == Severity::Debug));
    assert_eq!(logger.store().len("shop"), 5);
}

#[test]
fn test_page_request_round_trip_through_logger() {
    let (logger, _) = logger_with(LoggerConfig::default());
    for q in ["SELECT c", "SELECT a", "SELECT b"] {
        logger.log_query("shop", q, 1.0, &json!([]));
    }

    let response = logger
        .handle_page_request(&json!({
            "resource": "shop",
            "pageIndex": 0,
            "sortBy": [{"id": "query", "desc": true}]
        }))
        .unwrap();

    let queries: Vec<&str> = response.queries.iter().map(|e| e.query()).collect();
    assert_eq!(queries, vec!["SELECT c", "SELECT b", "SELECT a"]);
    assert_eq!(response.page_count, 1);
}
