//! querylog - In-memory query execution telemetry
//!
//! Records per-caller query executions, flags slow ones through a diagnostic
//! sink, and serves the recorded events back as summaries and sortable,
//! fixed-size pages for a monitoring consumer.

pub mod aggregate;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod event;
pub mod logger;
pub mod pager;
pub mod protocol;
pub mod store;
