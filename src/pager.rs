//! Paginated, sortable browsing of one caller's events
//!
//! Descending order is produced by reversing the ascending sort, not by a
//! descending comparator. Events with equal keys therefore come out in the
//! reverse of their insertion order when `descending` is set.

use crate::event::QueryEvent;
use crate::store::EventStore;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Fixed number of events per page
pub const PAGE_SIZE: usize = 12;

/// Field a page can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "executionTime")]
    ExecutionTime,
}

/// Requested ordering for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub descending: bool,
}

impl SortSpec {
    pub fn ascending(field: SortField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn descending(field: SortField) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

/// One page of a caller's events
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub events: Vec<QueryEvent>,
    pub page_count: usize,
}

/// Return page `page_index` (zero-based) of `caller`'s events
///
/// Unknown callers and out-of-range pages yield an empty page; this never fails.
pub fn page(store: &EventStore, caller: &str, page_index: usize, sort: Option<&SortSpec>) -> Page {
    store.with_events(caller, |events| {
        let page_count = page_count(events.len());
        let start = page_index.saturating_mul(PAGE_SIZE).min(events.len());
        let end = start.saturating_add(PAGE_SIZE).min(events.len());

        let events = match sort {
            Some(spec) => sorted(events, spec)[start..end].to_vec(),
            None => events[start..end].to_vec(),
        };

        Page { events, page_count }
    })
}

/// Number of pages needed for `len` events
pub fn page_count(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE)
}

/// Sorted copy of `events`: stable ascending sort, then a full reversal if descending
pub fn sorted(events: &[QueryEvent], spec: &SortSpec) -> Vec<QueryEvent> {
    let mut copy = events.to_vec();
    copy.sort_by(|a, b| compare(a, b, spec.field));
    if spec.descending {
        copy.reverse();
    }
    copy
}

fn compare(a: &QueryEvent, b: &QueryEvent, field: SortField) -> Ordering {
    match field {
        SortField::Query => a.query().cmp(b.query()),
        SortField::ExecutionTime => a.execution_time_ms().total_cmp(&b.execution_time_ms()),
    }
}
