use anyhow::{Context, Result};
use clap::Parser;
use querylog::cli::{Cli, Command, OutputFormat, SortArg};
use querylog::config::LoggerConfig;
use querylog::logger::QueryLogger;
use querylog::pager::{SortField, PAGE_SIZE};
use querylog::protocol::{InboundEvent, PageRequest, SortBy};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; diagnostics are emitted through it
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge the optional config file with command-line overrides
fn build_config(args: &Cli) -> Result<LoggerConfig> {
    let mut config = match &args.config {
        Some(path) => LoggerConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => LoggerConfig::default(),
    };

    if args.debug {
        config.debug = true;
    }
    if let Some(ms) = args.slow_query_threshold {
        config.slow_query_threshold_ms = ms;
    }
    if args.no_ui {
        config.ui_enabled = false;
    }
    if args.max_events_per_caller.is_some() {
        config.max_events_per_caller = args.max_events_per_caller;
    }

    config.validate()?;
    Ok(config)
}

/// Feed every JSON line of `reader` into the logger
fn replay(logger: &QueryLogger, reader: impl BufRead) -> Result<usize> {
    let mut count = 0;
    for (n, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read input line {}", n + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let event: InboundEvent = serde_json::from_str(&line)
            .with_context(|| format!("Invalid event on line {}", n + 1))?;
        logger.log_inbound(&event);
        count += 1;
    }
    tracing::debug!("Replayed {} events", count);
    Ok(count)
}

fn print_summary(logger: &QueryLogger, format: OutputFormat) -> Result<()> {
    let Some(summary) = logger.summary() else {
        eprintln!("UI reporting is disabled; no events were kept.");
        return Ok(());
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("  queries    total ms  resource");
    println!("--------- ----------- ----------------");
    for resource in &summary.resources {
        let events = logger.store().get(resource);
        let total: f64 = events.iter().map(|e| e.execution_time_ms()).sum();
        println!("{:>9} {:>11.3}  {}", events.len(), total, resource);
    }
    println!("--------- ----------- ----------------");
    println!("{:>9} {:>11.3}  total", summary.total_queries, summary.total_time);
    Ok(())
}

fn print_page(logger: &QueryLogger, request: &PageRequest, format: OutputFormat) -> Result<()> {
    let response = logger.page(request);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.page_count == 0 {
        eprintln!("No queries recorded for {}.", request.resource);
        return Ok(());
    }

    println!(
        "{} page {}/{} ({} per page)",
        request.resource,
        request.page_index.saturating_add(1),
        response.page_count,
        PAGE_SIZE
    );
    println!("         date         ms  query");
    for event in &response.queries {
        println!(
            "{:>13} {:>10.3}  {}",
            event.recorded_at(),
            event.execution_time_ms(),
            event.query()
        );
    }
    Ok(())
}

fn print_stats(logger: &QueryLogger, resource: &str, format: OutputFormat) -> Result<()> {
    let Some(stats) = logger.caller_stats(resource) else {
        eprintln!("No queries recorded for {}.", resource);
        return Ok(());
    };

    if format == OutputFormat::Json {
        let value = serde_json::json!({
            "resource": stats.caller,
            "count": stats.count,
            "totalTime": stats.total_ms,
            "mean": stats.mean,
            "stddev": stats.stddev,
            "min": stats.min,
            "max": stats.max,
            "p50": stats.p50,
            "p95": stats.p95,
            "p99": stats.p99,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} ({} queries, {:.3} ms total):", stats.caller, stats.count, stats.total_ms);
    println!("  Mean:         {:.2} ms", stats.mean);
    println!("  Std Dev:      {:.2} ms", stats.stddev);
    println!("  Min:          {:.2} ms", stats.min);
    println!("  Max:          {:.2} ms", stats.max);
    println!("  Median (P50): {:.2} ms", stats.p50);
    println!("  P95:          {:.2} ms", stats.p95);
    println!("  P99:          {:.2} ms", stats.p99);
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let config = build_config(&args)?;

    init_tracing(config.debug);
    let logger = QueryLogger::new(config)?;

    match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            replay(&logger, BufReader::new(file))?;
        }
        None => {
            replay(&logger, io::stdin().lock())?;
        }
    }

    match args.command {
        Command::Summary => print_summary(&logger, args.format)?,
        Command::Page {
            resource,
            page,
            sort,
            desc,
        } => {
            let sort_by = sort.map(|s| {
                let id = match s {
                    SortArg::Query => SortField::Query,
                    SortArg::ExecutionTime => SortField::ExecutionTime,
                };
                vec![SortBy { id, desc }]
            });
            let request = PageRequest {
                resource,
                page_index: page,
                sort_by,
            };
            print_page(&logger, &request, args.format)?;
        }
        Command::Stats { resource } => print_stats(&logger, &resource, args.format)?,
    }

    Ok(())
}
