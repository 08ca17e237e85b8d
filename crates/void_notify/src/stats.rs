//! Aggregate notification counters
//!
//! Rejections are counted rather than logged one by one. The janitor reports
//! what changed since its previous pass.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared between producers and the controller
#[derive(Debug, Default)]
pub struct NotifyCounters {
    accepted: AtomicU64,
    suppressed: AtomicU64,
    rate_limited: AtomicU64,
    closed: AtomicU64,
    shown: AtomicU64,
    destroyed: AtomicU64,
    render_failures: AtomicU64,
}

impl NotifyCounters {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_closed(&self) {
        self.closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_shown(&self) {
        self.shown.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_destroyed(&self) {
        self.destroyed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_render_failure(&self) {
        self.render_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current values
    pub fn snapshot(&self) -> NotifyStats {
        NotifyStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            closed: self.closed.load(Ordering::Relaxed),
            shown: self.shown.load(Ordering::Relaxed),
            destroyed: self.destroyed.load(Ordering::Relaxed),
            render_failures: self.render_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyStats {
    /// Admitted and queued
    pub accepted: u64,
    /// Dropped as duplicates
    pub suppressed: u64,
    /// Dropped because the queue was full
    pub rate_limited: u64,
    /// Dropped because the controller had shut down
    pub closed: u64,
    /// Visuals created
    pub shown: u64,
    /// Visuals destroyed
    pub destroyed: u64,
    /// Visuals the renderer failed to create
    pub render_failures: u64,
}

impl NotifyStats {
    /// Counter growth since an earlier snapshot
    pub fn since(&self, earlier: &NotifyStats) -> NotifyStats {
        NotifyStats {
            accepted: self.accepted.saturating_sub(earlier.accepted),
            suppressed: self.suppressed.saturating_sub(earlier.suppressed),
            rate_limited: self.rate_limited.saturating_sub(earlier.rate_limited),
            closed: self.closed.saturating_sub(earlier.closed),
            shown: self.shown.saturating_sub(earlier.shown),
            destroyed: self.destroyed.saturating_sub(earlier.destroyed),
            render_failures: self.render_failures.saturating_sub(earlier.render_failures),
        }
    }

    /// Total rejected submissions
    pub fn rejected(&self) -> u64 {
        self.suppressed + self.rate_limited + self.closed
    }
}
