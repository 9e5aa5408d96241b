//! CLI argument parsing for querylog

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for summaries and pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON in the consumer wire shape
    Json,
}

/// Sort field accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Query,
    ExecutionTime,
}

#[derive(Parser, Debug)]
#[command(name = "querylog")]
#[command(version)]
#[command(about = "Replay query execution events and browse the recorded telemetry", long_about = None)]
pub struct Cli {
    /// Load logger settings from a TOML file (flags override it)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Debug mode: report every query and enable trace logging
    #[arg(long)]
    pub debug: bool,

    /// Slow query threshold in milliseconds
    #[arg(long = "slow-query-threshold", value_name = "MS")]
    pub slow_query_threshold: Option<f64>,

    /// Do not keep events (diagnostics only)
    #[arg(long = "no-ui")]
    pub no_ui: bool,

    /// Keep at most N events per caller, evicting oldest first
    #[arg(long = "max-events-per-caller", value_name = "N")]
    pub max_events_per_caller: Option<usize>,

    /// Read JSON-lines events from FILE instead of stdin
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Totals across all callers
    Summary,

    /// One page of a caller's events
    Page {
        /// Caller (resource) name
        #[arg(short, long)]
        resource: String,

        /// Zero-based page index
        #[arg(short, long, default_value = "0")]
        page: usize,

        /// Sort field
        #[arg(short, long, value_enum)]
        sort: Option<SortArg>,

        /// Reverse the sorted order
        #[arg(long, requires = "sort")]
        desc: bool,
    },

    /// Latency statistics for one caller
    Stats {
        /// Caller (resource) name
        #[arg(short, long)]
        resource: String,
    },
}
