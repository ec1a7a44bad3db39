//! Virtual clock and cancelable delayed tasks.
//!
//! All latency and expiry in the engine is expressed as tasks on a
//! [`Scheduler`]. Time only moves when the owner calls [`Scheduler::advance`]
//! (or drains with [`Scheduler::pop_due`]), so tests step the clock
//! deterministically instead of sleeping.
//!
//! Tasks are plain values, not closures: the owner pops a due task and
//! dispatches it against its own state. Ties on the same deadline fire in
//! scheduling order.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Delayed work the engine schedules on its own clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Simulated round trip of the in-flight batch finished.
    BatchResolve { batch: u64 },
    /// Simulated page fetch finished.
    GrowResolve,
    /// Undo snapshot `generation` reached the end of its window.
    UndoExpiry { generation: u64 },
    /// Notification `generation` auto-closes.
    NotificationClose { generation: u64 },
}

/// Handle to a scheduled task, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Deterministic single-threaded timer queue over a virtual clock.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), T>,
    /// seq -> deadline, for cancellation.
    deadlines: HashMap<u64, Duration>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Current virtual time since the scheduler was created.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `task` to become due `delay` from now.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due = self.now.saturating_add(delay);
        self.queue.insert((due, seq), task);
        self.deadlines.insert(seq, due);
        TaskId(seq)
    }

    /// Cancel a scheduled task. Returns `false` if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let Some(due) = self.deadlines.remove(&id.0) else {
            return false;
        };
        self.queue.remove(&(due, id.0)).is_some()
    }

    /// Deadline of the earliest pending task.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Pop the earliest task due at or before `until`, moving the clock to
    /// its deadline.
    ///
    /// Owners that dispatch tasks which may schedule further tasks loop on
    /// this and then call [`settle`](Self::settle) with the same `until`.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        let (&(due, seq), _) = self.queue.iter().next()?;
        if due > until {
            return None;
        }
        let task = self.queue.remove(&(due, seq))?;
        self.deadlines.remove(&seq);
        self.now = self.now.max(due);
        Some(task)
    }

    /// Move the clock forward to `until` (never backwards).
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Advance the clock by `by` and return every task that became due, in
    /// deadline order.
    pub fn advance(&mut self, by: Duration) -> Vec<T> {
        let until = self.now.saturating_add(by);
        let mut fired = Vec::new();
        while let Some(task) = self.pop_due(until) {
            fired.push(task);
        }
        self.settle(until);
        fired
    }
}
