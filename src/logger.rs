//! Query logger facade
//!
//! Ties classification, storage and the two consumer requests together. The
//! host owns the transport: it calls [`QueryLogger::log_query`] for each
//! execution and forwards summary/page requests, sending back whatever
//! `Some` response comes out.

use crate::aggregate::{self, CallerStats};
use crate::classifier::{self, Diagnostic};
use crate::config::{self, LoggerConfig};
use crate::event::QueryEvent;
use crate::pager;
use crate::protocol::{self, InboundEvent, PageRequest, PageResponse, SummaryResponse};
use crate::store::EventStore;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Destination for diagnostic lines
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: &Diagnostic);
}

/// Default sink: forwards diagnostics to `tracing`
///
/// Both severities go out at WARN level so debug-mode diagnostics survive a
/// `warn` filter; the severity tag is part of the message itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        tracing::warn!(
            target: "querylog::diagnostic",
            severity = diagnostic.severity.as_str(),
            "{}",
            diagnostic
        );
    }
}

/// Records query executions and answers monitoring requests
pub struct QueryLogger {
    config: LoggerConfig,
    store: Arc<EventStore>,
    sink: Box<dyn DiagnosticSink>,
}

impl QueryLogger {
    /// Build a logger with its own store and the tracing sink
    pub fn new(config: LoggerConfig) -> config::Result<Self> {
        config.validate()?;
        let store = Arc::new(EventStore::with_retention(config.retention()));
        Ok(Self::with_store(config, store, Box::new(TracingSink)))
    }

    /// Build a logger around an existing store and sink
    ///
    /// The store's retention policy is used as-is; `config.max_events_per_caller`
    /// only applies to stores built by [`QueryLogger::new`].
    pub fn with_store(config: LoggerConfig, store: Arc<EventStore>, sink: Box<dyn DiagnosticSink>) -> Self {
        Self { config, store, sink }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    /// Record one execution
    ///
    /// The diagnostic runs regardless of `ui_enabled`; storage only when it is set.
    pub fn log_query<P: Serialize + ?Sized>(
        &self,
        caller: &str,
        query: &str,
        execution_time_ms: f64,
        parameters: &P,
    ) {
        if let Some(diagnostic) = classifier::diagnose(
            caller,
            query,
            execution_time_ms,
            parameters,
            self.config.debug,
            self.config.slow_query_threshold_ms,
        ) {
            self.sink.emit(&diagnostic);
        }

        if !self.config.ui_enabled {
            return;
        }

        self.store.append(caller, QueryEvent::new(query, execution_time_ms));
    }

    /// Record an execution received in wire form
    pub fn log_inbound(&self, event: &InboundEvent) {
        self.log_query(
            &event.caller_id,
            &event.query,
            event.execution_time_ms,
            &event.parameters,
        );
    }

    /// Answer a summary request (`None` while the UI is disabled)
    pub fn summary(&self) -> Option<SummaryResponse> {
        if !self.config.ui_enabled {
            return None;
        }
        Some(aggregate::summarize(&self.store).into())
    }

    /// Answer a typed page request
    pub fn page(&self, request: &PageRequest) -> PageResponse {
        let sort = request.sort();
        pager::page(&self.store, &request.resource, request.page_index, sort.as_ref()).into()
    }

    /// Answer an untyped page request; malformed requests get no response
    pub fn handle_page_request(&self, raw: &Value) -> Option<PageResponse> {
        match protocol::decode_page_request(raw) {
            Ok(request) => Some(self.page(&request)),
            Err(e) => {
                tracing::debug!("Dropping malformed page request: {}", e);
                None
            }
        }
    }

    /// Latency statistics for one caller
    pub fn caller_stats(&self, caller: &str) -> Option<CallerStats> {
        aggregate::caller_stats(&self.store, caller)
    }
}
