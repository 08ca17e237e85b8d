//! Bounded dispatch queue and drain pacing
//!
//! Admitted notifications wait in a bounded channel. Producers never block:
//! a full queue rejects the entry. The controller is the single consumer and
//! drains at most one entry per pacing tick.

use crate::notification::QueuedNotification;
use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use std::time::Duration;

/// Upper bound on pacing ticks credited for a single update
pub const MAX_TICKS_PER_UPDATE: u32 = 8;

/// Why an entry was not enqueued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueError {
    /// Queue at capacity
    Full,
    /// Consumer has gone away
    Closed,
}

/// Producer side of the dispatch queue
#[derive(Debug, Clone)]
pub struct DispatchSender {
    sender: Sender<QueuedNotification>,
    capacity: usize,
}

impl DispatchSender {
    /// Enqueue without blocking
    pub fn try_enqueue(&self, entry: QueuedNotification) -> Result<(), EnqueueError> {
        match self.sender.try_send(entry) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(EnqueueError::Full),
            Err(TrySendError::Disconnected(_)) => Err(EnqueueError::Closed),
        }
    }

    /// Entries currently waiting
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    /// Whether nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }

    /// Maximum number of waiting entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Consumer side of the dispatch queue
#[derive(Debug)]
pub struct DispatchReceiver {
    receiver: Receiver<QueuedNotification>,
}

impl DispatchReceiver {
    /// Pop the oldest entry if one is waiting
    pub fn try_dequeue(&self) -> Option<QueuedNotification> {
        match self.receiver.try_recv() {
            Ok(entry) => Some(entry),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Entries currently waiting
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Whether nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

/// Create a queue holding at most `capacity` entries
pub fn dispatch_queue(capacity: usize) -> (DispatchSender, DispatchReceiver) {
    let capacity = capacity.max(1);
    let (sender, receiver) = crossbeam_channel::bounded(capacity);

    (
        DispatchSender { sender, capacity },
        DispatchReceiver { receiver },
    )
}

/// Converts frame time into dispatch ticks at a fixed cadence
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: f32,
    accumulated: f32,
}

impl Pacer {
    /// Create a pacer ticking every `interval`; zero disables pacing
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.as_secs_f32(),
            accumulated: 0.0,
        }
    }

    /// Whether every update drains the whole queue
    pub fn is_unpaced(&self) -> bool {
        self.interval <= 0.0
    }

    /// Credit `delta_time` seconds and return how many ticks elapsed
    ///
    /// Returns `u32::MAX` when pacing is disabled.
    pub fn advance(&mut self, delta_time: f32) -> u32 {
        if self.is_unpaced() {
            return u32::MAX;
        }

        if delta_time.is_finite() && delta_time > 0.0 {
            self.accumulated += delta_time;
        }

        let due = (self.accumulated / self.interval).floor();
        if due < 1.0 {
            return 0;
        }

        self.accumulated -= due * self.interval;
        if due >= MAX_TICKS_PER_UPDATE as f32 {
            // Drop the backlog after a long stall
            self.accumulated = 0.0;
            return MAX_TICKS_PER_UPDATE;
        }

        due as u32
    }

    /// Forget accumulated time
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}
