//! Admission control: duplicate suppression and rate limiting
//!
//! Every submission goes through [`AdmissionGate::admit`]:
//!
//! 1. The message text is looked up in the [`TimestampRegistry`]. A hit
//!    younger than the duplicate window suppresses the submission.
//! 2. Otherwise the message is stamped with the current time, under the same
//!    lock as the lookup, so two racing submissions of one message admit once.
//! 3. The entry is offered to the bounded dispatch queue. A full queue rate
//!    limits the submission and the message is dropped.
//!
//! The [`Janitor`] thread prunes stale registry entries and periodically logs
//! how many submissions were rejected.

use crate::clock::Clock;
use crate::dispatch::{DispatchSender, EnqueueError};
use crate::notification::{NotificationId, NotificationRequest, QueuedNotification};
use crate::stats::{NotifyCounters, NotifyStats};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Registry entries older than this many cleanup intervals are pruned
pub const RETENTION_INTERVALS: u32 = 10;

/// Outcome of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Queued for display
    Accepted(NotificationId),
    /// Same message seen within the duplicate window
    Suppressed,
    /// Dispatch queue was full
    RateLimited,
    /// Controller has shut down
    Closed,
}

impl Admission {
    /// Whether the notification will be shown
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted(_))
    }

    /// Assigned id, if accepted
    pub fn id(&self) -> Option<NotificationId> {
        match self {
            Admission::Accepted(id) => Some(*id),
            _ => None,
        }
    }
}

/// Key identifying a message for deduplication
///
/// The full message text is the key, so distinct messages can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(Arc<str>);

impl Fingerprint {
    /// Fingerprint of a message
    pub fn of(message: &Arc<str>) -> Self {
        Self(Arc::clone(message))
    }

    /// The message text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Last time each message was admitted
#[derive(Debug, Default)]
pub struct TimestampRegistry {
    entries: Mutex<HashMap<Fingerprint, Instant>>,
}

impl TimestampRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp `fingerprint` with `now` unless it was stamped within `window`
    ///
    /// Returns false if the message is a duplicate. A stamp newer than `now`,
    /// written by a concurrent admission, also counts as a duplicate.
    pub fn check_and_stamp(&self, fingerprint: &Fingerprint, now: Instant, window: Duration) -> bool {
        let mut entries = self.entries.lock();

        if let Some(&last_seen) = entries.get(fingerprint) {
            if now.saturating_duration_since(last_seen) <= window {
                return false;
            }
        }

        entries.insert(fingerprint.clone(), now);
        true
    }

    /// Remove the stamp for `fingerprint` if it still equals `stamped_at`
    pub fn revoke(&self, fingerprint: &Fingerprint, stamped_at: Instant) {
        let mut entries = self.entries.lock();
        if entries.get(fingerprint) == Some(&stamped_at) {
            entries.remove(fingerprint);
        }
    }

    /// Last admission time of a message
    pub fn last_seen(&self, fingerprint: &Fingerprint) -> Option<Instant> {
        self.entries.lock().get(fingerprint).copied()
    }

    /// Drop entries last seen more than `max_age` before `now`
    ///
    /// Returns the number of removed entries.
    pub fn prune(&self, now: Instant, max_age: Duration) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, last_seen| now.saturating_duration_since(*last_seen) <= max_age);
        before - entries.len()
    }

    /// Number of tracked messages
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no messages are tracked
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Decides whether submissions proceed to the dispatch queue
pub struct AdmissionGate {
    registry: TimestampRegistry,
    duplicate_window: Duration,
    queue: DispatchSender,
    counters: Arc<NotifyCounters>,
    clock: Arc<dyn Clock>,
    next_id: AtomicU64,
}

impl AdmissionGate {
    /// Create a gate feeding `queue`
    pub fn new(
        queue: DispatchSender,
        duplicate_window: Duration,
        counters: Arc<NotifyCounters>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry: TimestampRegistry::new(),
            duplicate_window,
            queue,
            counters,
            clock,
            next_id: AtomicU64::new(1),
        }
    }

    /// Run a request through deduplication and rate limiting
    pub fn admit(&self, request: NotificationRequest) -> Admission {
        let fingerprint = Fingerprint::of(&request.message);
        let now = self.clock.now();

        if !self
            .registry
            .check_and_stamp(&fingerprint, now, self.duplicate_window)
        {
            self.counters.record_suppressed();
            return Admission::Suppressed;
        }

        let id = NotificationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        match self.queue.try_enqueue(QueuedNotification { id, request }) {
            Ok(()) => {
                self.counters.record_accepted();
                Admission::Accepted(id)
            }
            Err(EnqueueError::Full) => {
                self.registry.revoke(&fingerprint, now);
                self.counters.record_rate_limited();
                Admission::RateLimited
            }
            Err(EnqueueError::Closed) => {
                self.registry.revoke(&fingerprint, now);
                self.counters.record_closed();
                Admission::Closed
            }
        }
    }

    /// Prune registry entries older than `max_age`
    pub fn prune(&self, max_age: Duration) -> usize {
        self.registry.prune(self.clock.now(), max_age)
    }

    /// The duplicate registry
    pub fn registry(&self) -> &TimestampRegistry {
        &self.registry
    }

    /// Entries waiting in the dispatch queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Shared counters
    pub fn counters(&self) -> &Arc<NotifyCounters> {
        &self.counters
    }
}

impl std::fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("duplicate_window", &self.duplicate_window)
            .field("tracked", &self.registry.len())
            .field("pending", &self.queue.len())
            .finish()
    }
}

/// Background thread pruning the duplicate registry
pub struct Janitor {
    shutdown: Option<Sender<()>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Janitor {
    /// Start pruning `gate` every `interval`
    pub fn start(gate: Arc<AdmissionGate>, interval: Duration) -> std::io::Result<Self> {
        let (shutdown, signal) = crossbeam_channel::bounded(1);

        let handle = thread::Builder::new()
            .name("notify-janitor".to_string())
            .spawn(move || {
                Self::janitor_loop(gate, interval, signal);
            })?;

        log::debug!("Notification janitor started ({:?} interval)", interval);

        Ok(Self {
            shutdown: Some(shutdown),
            thread_handle: Some(handle),
        })
    }

    /// Whether the thread is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stop the thread and wait for it
    pub fn stop(&mut self) {
        // Dropping the sender disconnects the channel and wakes the loop
        self.shutdown.take();

        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                log::error!("Notification janitor panicked");
            } else {
                log::debug!("Notification janitor stopped");
            }
        }
    }

    fn janitor_loop(gate: Arc<AdmissionGate>, interval: Duration, signal: Receiver<()>) {
        let max_age = interval * RETENTION_INTERVALS;
        let mut last_report = gate.counters().snapshot();

        loop {
            match signal.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }

            Self::sweep(&gate, max_age, &mut last_report, interval);
        }
    }

    /// One cleanup pass: prune old records and report counters since `last_report`
    ///
    /// Returns the counter delta that was reported.
    fn sweep(
        gate: &AdmissionGate,
        max_age: Duration,
        last_report: &mut NotifyStats,
        interval: Duration,
    ) -> NotifyStats {
        let removed = gate.prune(max_age);
        if removed > 0 {
            log::trace!("Pruned {} stale notification records", removed);
        }

        let current = gate.counters().snapshot();
        let delta = current.since(last_report);
        report(&delta, interval);
        *last_report = current;
        delta
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Janitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Janitor")
            .field("running", &self.is_running())
            .finish()
    }
}

fn report(delta: &NotifyStats, interval: Duration) {
    if delta.suppressed > 0 {
        log::info!(
            "Suppressed {} duplicate notifications in the last {:?}",
            delta.suppressed,
            interval
        );
    }
    if delta.rate_limited > 0 {
        log::warn!(
            "Dropped {} notifications in the last {:?}: dispatch queue full",
            delta.rate_limited,
            interval
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::dispatch::{dispatch_queue, DispatchReceiver};

    fn gate(capacity: usize, clock: Arc<ManualClock>) -> (Arc<AdmissionGate>, DispatchReceiver) {
        let (sender, receiver) = dispatch_queue(capacity);
        let gate = AdmissionGate::new(
            sender,
            Duration::from_millis(1000),
            Arc::new(NotifyCounters::new()),
            clock,
        );
        (Arc::new(gate), receiver)
    }

    #[test]
    fn test_duplicate_within_window_is_suppressed() {
        let clock = Arc::new(ManualClock::new());
        let (gate, _receiver) = gate(10, Arc::clone(&clock));

        assert!(gate.admit(NotificationRequest::success("Saved")).is_accepted());
        clock.advance(Duration::from_millis(400));
        assert_eq!(gate.admit(NotificationRequest::success("Saved")), Admission::Suppressed);

        // Exactly at the window edge is still a duplicate
        clock.advance(Duration::from_millis(600));
        assert_eq!(gate.admit(NotificationRequest::error("Saved")), Admission::Suppressed);

        let stats = gate.counters().snapshot();
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.suppressed, 2);
    }

    #[test]
    fn test_suppression_does_not_refresh_timestamp() {
        let clock = Arc::new(ManualClock::new());
        let (gate, _receiver) = gate(10, Arc::clone(&clock));

        assert!(gate.admit(NotificationRequest::success("Saved")).is_accepted());
        clock.advance(Duration::from_millis(900));
        assert_eq!(gate.admit(NotificationRequest::success("Saved")), Admission::Suppressed);
        clock.advance(Duration::from_millis(200));
        assert!(gate.admit(NotificationRequest::success("Saved")).is_accepted());
    }

    #[test]
    fn test_duplicate_after_window_is_accepted() {
        let clock = Arc::new(ManualClock::new());
        let (gate, receiver) = gate(10, Arc::clone(&clock));

        let first = gate.admit(NotificationRequest::success("Saved"));
        clock.advance(Duration::from_millis(1001));
        let second = gate.admit(NotificationRequest::success("Saved"));

        assert!(first.is_accepted());
        assert!(second.is_accepted());
        assert_ne!(first.id(), second.id());
        assert_eq!(receiver.len(), 2);
    }

    #[test]
    fn test_distinct_messages_are_independent() {
        let clock = Arc::new(ManualClock::new());
        let (gate, _receiver) = gate(10, clock);

        assert!(gate.admit(NotificationRequest::success("Saved")).is_accepted());
        assert!(gate.admit(NotificationRequest::success("Saved!")).is_accepted());
        assert!(gate.admit(NotificationRequest::success("saved")).is_accepted());
    }

    #[test]
    fn test_full_queue_rate_limits() {
        let clock = Arc::new(ManualClock::new());
        let (gate, receiver) = gate(3, clock);

        let outcomes: Vec<Admission> = (0..5)
            .map(|i| gate.admit(NotificationRequest::success(format!("item {}", i))))
            .collect();

        let accepted = outcomes.iter().filter(|a| a.is_accepted()).count();
        let limited = outcomes.iter().filter(|a| **a == Admission::RateLimited).count();
        assert_eq!(accepted, 3);
        assert_eq!(limited, 2);
        assert_eq!(receiver.len(), 3);
        assert_eq!(gate.counters().snapshot().rate_limited, 2);

        // A rate limited message leaves no duplicate record behind
        receiver.try_dequeue();
        assert!(gate.admit(NotificationRequest::success("item 4")).is_accepted());
    }

    #[test]
    fn test_closed_queue() {
        let clock = Arc::new(ManualClock::new());
        let (gate, receiver) = gate(3, clock);
        drop(receiver);

        assert_eq!(gate.admit(NotificationRequest::success("late")), Admission::Closed);
        assert!(gate.registry().is_empty());
        assert_eq!(gate.counters().snapshot().closed, 1);
    }

    #[test]
    fn test_registry_prune() {
        let registry = TimestampRegistry::new();
        let start = Instant::now();
        let window = Duration::from_secs(1);

        assert!(registry.check_and_stamp(&Fingerprint::of(&Arc::from("old")), start, window));
        assert!(registry.check_and_stamp(
            &Fingerprint::of(&Arc::from("new")),
            start + Duration::from_secs(90),
            window
        ));

        let removed = registry.prune(start + Duration::from_secs(101), Duration::from_secs(100));
        assert_eq!(removed, 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.last_seen(&Fingerprint::of(&Arc::from("new"))).is_some());
    }

    #[test]
    fn test_newer_concurrent_stamp_wins() {
        let registry = TimestampRegistry::new();
        let fingerprint = Fingerprint::of(&Arc::from("race"));
        let early = Instant::now();
        let late = early + Duration::from_millis(5);

        assert!(registry.check_and_stamp(&fingerprint, late, Duration::ZERO));
        assert!(!registry.check_and_stamp(&fingerprint, early, Duration::ZERO));
        assert_eq!(registry.last_seen(&fingerprint), Some(late));
    }

    #[test]
    fn test_concurrent_admission_admits_once() {
        let clock = Arc::new(ManualClock::new());
        let (gate, receiver) = gate(64, clock);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                thread::spawn(move || gate.admit(NotificationRequest::warning("Connection lost")))
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Admission::is_accepted)
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(receiver.len(), 1);
        assert_eq!(gate.counters().snapshot().suppressed, 7);
    }

    #[test]
    fn test_sweep_reports_counts_since_last_pass() {
        let clock = Arc::new(ManualClock::new());
        let (gate, _receiver) = gate(1, Arc::clone(&clock));
        let interval = Duration::from_secs(10);
        let mut last_report = gate.counters().snapshot();

        assert!(gate.admit(NotificationRequest::success("Saved")).is_accepted());
        assert_eq!(gate.admit(NotificationRequest::success("Saved")), Admission::Suppressed);
        assert_eq!(gate.admit(NotificationRequest::success("Saved")), Admission::Suppressed);
        assert_eq!(gate.admit(NotificationRequest::warning("Low ammo")), Admission::RateLimited);

        let delta = Janitor::sweep(&gate, interval * RETENTION_INTERVALS, &mut last_report, interval);
        assert_eq!(delta.accepted, 1);
        assert_eq!(delta.suppressed, 2);
        assert_eq!(delta.rate_limited, 1);

        // Nothing new since the previous pass
        let delta = Janitor::sweep(&gate, interval * RETENTION_INTERVALS, &mut last_report, interval);
        assert_eq!(delta.suppressed, 0);
        assert_eq!(delta.rate_limited, 0);

        assert_eq!(gate.admit(NotificationRequest::success("Saved")), Admission::Suppressed);
        let delta = Janitor::sweep(&gate, interval * RETENTION_INTERVALS, &mut last_report, interval);
        assert_eq!(delta.suppressed, 1);
        assert_eq!(delta.rate_limited, 0);
    }

    #[test]
    fn test_janitor_lifecycle() {
        let clock = Arc::new(ManualClock::new());
        let (gate, _receiver) = gate(4, Arc::clone(&clock));

        gate.admit(NotificationRequest::success("Saved"));
        clock.advance(Duration::from_secs(60));

        let mut janitor = Janitor::start(Arc::clone(&gate), Duration::from_millis(5)).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while !gate.registry().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(gate.registry().is_empty());

        janitor.stop();
        assert!(!janitor.is_running());
    }
}
