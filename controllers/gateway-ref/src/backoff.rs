//! # Fibonacci Backoff
//!
//! Requeue delays for objects whose last reconcile did not succeed.
//!
//! Delays follow the Fibonacci sequence in minutes, capped at a maximum:
//! 1m, 1m, 2m, 3m, 5m, 8m, 10m, 10m, ... for the default 1/10 bounds.
//! Each object keeps its own position in the sequence; a successful reconcile
//! resets it.

use crds::{ObjectKind, ScopedIdentity};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Fibonacci backoff sequence for a single object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FibonacciBackoff {
    min_minutes: u64,
    max_minutes: u64,
    prev_minutes: u64,
    current_minutes: u64,
}

impl FibonacciBackoff {
    /// Create a sequence starting at `min_minutes` and capped at `max_minutes`
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            max_minutes,
            prev_minutes: 0,
            current_minutes: min_minutes.min(max_minutes),
        }
    }

    /// Return the current delay and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let delay = Duration::from_secs(self.current_minutes.saturating_mul(60));

        let next = self.prev_minutes.saturating_add(self.current_minutes);
        self.prev_minutes = self.current_minutes;
        self.current_minutes = next.min(self.max_minutes);

        delay
    }

    /// Restart the sequence from the minimum
    pub fn reset(&mut self) {
        self.prev_minutes = 0;
        self.current_minutes = self.min_minutes.min(self.max_minutes);
    }
}

/// Per-object backoff state shared by the watchers.
///
/// Keyed by kind and identity so a VirtualService and a DestinationRule with
/// the same name back off independently.
#[derive(Debug)]
pub struct BackoffTracker {
    min_minutes: u64,
    max_minutes: u64,
    states: Mutex<HashMap<(ObjectKind, ScopedIdentity), FibonacciBackoff>>,
}

impl BackoffTracker {
    /// Create a tracker whose sequences use the given bounds
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            max_minutes,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Next requeue delay for an object, advancing its sequence
    pub fn next_delay(&self, kind: ObjectKind, identity: &ScopedIdentity) -> Duration {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states
            .entry((kind, identity.clone()))
            .or_insert_with(|| FibonacciBackoff::new(self.min_minutes, self.max_minutes))
            .next_backoff()
    }

    /// Forget an object's backoff after a successful reconcile
    pub fn reset(&self, kind: ObjectKind, identity: &ScopedIdentity) {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        states.remove(&(kind, identity.clone()));
    }

    /// Number of objects currently backing off
    pub fn tracked(&self) -> usize {
        self.states.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
