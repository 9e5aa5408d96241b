//! Per-caller event storage
//!
//! The store maps a caller identity to its events in arrival order. It is an
//! explicit object shared through `Arc`, so tests and embedders can run any
//! number of independent instances.
//!
//! # Locking
//!
//! One `RwLock` guards the whole map. `append` takes the write lock and is the
//! serialization point for a caller's ordering; every read path takes the read
//! lock. A poisoned lock is recovered instead of propagated: a panic elsewhere
//! in the host must not take query telemetry down with it.
//!
//! # Retention
//!
//! By default the store never evicts, so memory grows with the number of
//! recorded events for the lifetime of the process. Long-running hosts should
//! set [`RetentionPolicy::MaxPerCaller`], which drops the oldest event of a
//! caller once its cap is reached.

use crate::event::QueryEvent;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// How many events the store keeps per caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    /// Keep everything (unbounded memory growth)
    #[default]
    Unbounded,
    /// Keep at most `n` events per caller, evicting oldest first
    MaxPerCaller(usize),
}

impl RetentionPolicy {
    /// Build a policy from an optional per-caller cap
    pub fn from_cap(cap: Option<usize>) -> Self {
        match cap {
            Some(n) => Self::MaxPerCaller(n),
            None => Self::Unbounded,
        }
    }

    fn cap(&self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::MaxPerCaller(n) => Some(*n),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    /// Caller name -> slot in `callers`
    index: HashMap<String, usize>,
    /// Callers in first-seen order with their events
    callers: Vec<(String, VecDeque<QueryEvent>)>,
    total_events: usize,
}

/// Thread-safe mapping from caller identity to recorded events
#[derive(Debug, Default)]
pub struct EventStore {
    inner: RwLock<Inner>,
    retention: RetentionPolicy,
    evicted: AtomicU64,
}

impl EventStore {
    /// Create an empty, unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given retention policy
    ///
    /// A `MaxPerCaller(0)` policy is treated as `MaxPerCaller(1)`; callers that
    /// load the policy from configuration reject zero before reaching here.
    pub fn with_retention(retention: RetentionPolicy) -> Self {
        let retention = match retention {
            RetentionPolicy::MaxPerCaller(0) => RetentionPolicy::MaxPerCaller(1),
            other => other,
        };
        Self {
            retention,
            ..Self::default()
        }
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// Append an event at the end of `caller`'s sequence
    pub fn append(&self, caller: &str, event: QueryEvent) {
        let mut guard = self.write();
        let inner = &mut *guard;
        let slot = match inner.index.get(caller) {
            Some(&slot) => slot,
            None => {
                let slot = inner.callers.len();
                inner.callers.push((caller.to_string(), VecDeque::new()));
                inner.index.insert(caller.to_string(), slot);
                tracing::trace!(caller, "first event recorded for caller");
                slot
            }
        };

        let mut dropped = 0;
        let events = &mut inner.callers[slot].1;
        if let Some(cap) = self.retention.cap() {
            while events.len() >= cap {
                events.pop_front();
                dropped += 1;
            }
        }
        events.push_back(event);
        // readers borrow one slice; eviction can wrap the ring
        events.make_contiguous();
        inner.total_events = inner.total_events + 1 - dropped;

        if dropped > 0 {
            self.evicted.fetch_add(dropped as u64, Ordering::Relaxed);
        }
    }

    /// Snapshot of `caller`'s events in insertion order (empty if unknown)
    pub fn get(&self, caller: &str) -> Vec<QueryEvent> {
        self.with_events(caller, |events| events.to_vec())
    }

    /// All callers with at least one event, in first-seen order
    pub fn callers(&self) -> Vec<String> {
        self.read()
            .callers
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Number of events currently held for `caller`
    pub fn len(&self, caller: &str) -> usize {
        let inner = self.read();
        inner
            .index
            .get(caller)
            .map(|&slot| inner.callers[slot].1.len())
            .unwrap_or(0)
    }

    /// Number of events held across all callers
    pub fn total_events(&self) -> usize {
        self.read().total_events
    }

    pub fn is_empty(&self) -> bool {
        self.total_events() == 0
    }

    /// Events dropped so far by the retention policy
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    /// Run `f` over `caller`'s events under the read lock
    ///
    /// Unknown callers see an empty slice.
    pub fn with_events<R>(&self, caller: &str, f: impl FnOnce(&[QueryEvent]) -> R) -> R {
        let inner = self.read();
        match inner.index.get(caller) {
            Some(&slot) => f(contiguous(&inner.callers[slot].1)),
            None => f(&[]),
        }
    }

    /// Visit every caller and its events, in first-seen order, under one read lock
    pub fn for_each_caller(&self, mut f: impl FnMut(&str, &[QueryEvent])) {
        let inner = self.read();
        for (name, events) in &inner.callers {
            f(name, contiguous(events));
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The deque as one slice; `append` keeps every deque contiguous
fn contiguous(events: &VecDeque<QueryEvent>) -> &[QueryEvent] {
    let (front, back) = events.as_slices();
    debug_assert!(back.is_empty(), "event deque left wrapped");
    front
}
