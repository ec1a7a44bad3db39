//! Incremental pagination window over the status-filtered item list.
//!
//! The window is a growing prefix of the filtered list. Growth is
//! asynchronous (simulated fetch latency) and guarded by its own busy flag:
//! requests made while a grow is in flight collapse into that one request.

use std::time::Duration;

use modq_core::Status;

use crate::clock::{Scheduler, Timer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingGrow {
    step: usize,
    /// Filter generation the request was made under.
    filter_generation: u64,
}

#[derive(Debug, Clone)]
pub struct PaginationWindow {
    filter: Status,
    loaded: usize,
    initial: usize,
    pending: Option<PendingGrow>,
    filter_generation: u64,
}

impl PaginationWindow {
    #[must_use]
    pub const fn new(filter: Status, initial: usize) -> Self {
        Self {
            filter,
            loaded: initial,
            initial,
            pending: None,
            filter_generation: 0,
        }
    }

    #[must_use]
    pub const fn filter(&self) -> Status {
        self.filter
    }

    /// Raw loaded count. May exceed the filtered length right after a reset;
    /// use [`effective_count`](Self::effective_count) for rendering.
    #[must_use]
    pub const fn loaded_count(&self) -> usize {
        self.loaded
    }

    #[must_use]
    pub const fn initial_size(&self) -> usize {
        self.initial
    }

    #[must_use]
    pub fn effective_count(&self, filtered_len: usize) -> usize {
        self.loaded.min(filtered_len)
    }

    /// The first `loaded` elements of `filtered`, in their existing order.
    #[must_use]
    pub fn visible_slice<'a, T>(&self, filtered: &'a [T]) -> &'a [T] {
        &filtered[..self.effective_count(filtered.len())]
    }

    /// Whether there is anything left to reveal.
    #[must_use]
    pub const fn has_more(&self, filtered_len: usize) -> bool {
        self.loaded < filtered_len
    }

    #[must_use]
    pub const fn is_growing(&self) -> bool {
        self.pending.is_some()
    }

    /// Switch to `filter`, resetting the loaded count. Returns `false` if the
    /// filter was already active (nothing changes then).
    pub fn set_filter(&mut self, filter: Status) -> bool {
        if filter == self.filter {
            return false;
        }
        self.filter = filter;
        self.reset_on_filter_change();
        true
    }

    /// Put the loaded count back to the initial size.
    pub fn reset_on_filter_change(&mut self) {
        self.loaded = self.initial;
        self.filter_generation += 1;
    }

    /// Ask for `step` more items. Returns `false` when a grow is already in
    /// flight; the request then collapses into it.
    pub fn grow_by(
        &mut self,
        step: usize,
        latency: Duration,
        scheduler: &mut Scheduler<Timer>,
    ) -> bool {
        if self.pending.is_some() {
            tracing::debug!("grow request collapsed into in-flight grow");
            return false;
        }
        self.pending = Some(PendingGrow {
            step,
            filter_generation: self.filter_generation,
        });
        scheduler.schedule(latency, Timer::GrowResolve);
        true
    }

    /// Timer callback. Applies the pending growth clamped to `filtered_len`
    /// and releases the busy flag.
    ///
    /// Returns the new loaded count, or `None` if nothing was applied
    /// (no grow pending, or the filter changed while it was in flight).
    pub fn resolve_grow(&mut self, filtered_len: usize) -> Option<usize> {
        let pending = self.pending.take()?;
        if pending.filter_generation != self.filter_generation {
            tracing::debug!("grow resolved after filter change; dropped");
            return None;
        }
        let before = self.loaded;
        self.loaded = (self.loaded + pending.step).min(filtered_len);
        tracing::info!(
            filter = %self.filter,
            from = before,
            to = self.loaded,
            "pagination window grew"
        );
        Some(self.loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LATENCY: Duration = Duration::from_millis(500);

    fn settle(window: &mut PaginationWindow, sched: &mut Scheduler<Timer>, len: usize) {
        for timer in sched.advance(LATENCY) {
            if timer == Timer::GrowResolve {
                window.resolve_grow(len);
            }
        }
    }

    #[test]
    fn visible_slice_is_a_prefix() {
        let w = PaginationWindow::new(Status::Pending, 3);
        let items = [10, 20, 30, 40, 50];
        assert_eq!(w.visible_slice(&items), &[10, 20, 30]);
        assert_eq!(w.visible_slice(&items[..2]), &[10, 20]);
        assert!(w.visible_slice::<i32>(&[]).is_empty());
    }

    #[test]
    fn grow_clamps_to_filtered_len() {
        let mut w = PaginationWindow::new(Status::Pending, 10);
        let mut sched = Scheduler::new();
        assert!(w.grow_by(10, LATENCY, &mut sched));
        assert!(w.is_growing());
        settle(&mut w, &mut sched, 14);
        assert!(!w.is_growing());
        assert_eq!(w.loaded_count(), 14);
        assert!(!w.has_more(14));
    }

    #[test]
    fn overlapping_grows_collapse() {
        let mut w = PaginationWindow::new(Status::Pending, 10);
        let mut sched = Scheduler::new();
        assert!(w.grow_by(10, LATENCY, &mut sched));
        assert!(!w.grow_by(10, LATENCY, &mut sched));
        assert_eq!(sched.len(), 1);
        settle(&mut w, &mut sched, 100);
        assert_eq!(w.loaded_count(), 20);
    }

    #[test]
    fn reset_restores_initial_size() {
        let mut w = PaginationWindow::new(Status::Pending, 10);
        let mut sched = Scheduler::new();
        w.grow_by(25, LATENCY, &mut sched);
        settle(&mut w, &mut sched, 100);
        assert_eq!(w.loaded_count(), 35);
        assert!(w.set_filter(Status::Approved));
        assert_eq!(w.loaded_count(), 10);
        assert!(!w.set_filter(Status::Approved));
    }

    #[test]
    fn grow_in_flight_across_filter_change_is_dropped() {
        let mut w = PaginationWindow::new(Status::Pending, 10);
        let mut sched = Scheduler::new();
        w.grow_by(10, LATENCY, &mut sched);
        w.set_filter(Status::Rejected);
        assert!(w.is_growing(), "in-flight grow is not cancelled");
        settle(&mut w, &mut sched, 100);
        assert!(!w.is_growing());
        assert_eq!(w.loaded_count(), 10);
    }

    #[test]
    fn effective_count_never_exceeds_filtered_len() {
        let w = PaginationWindow::new(Status::Pending, 10);
        assert_eq!(w.loaded_count(), 10);
        assert_eq!(w.effective_count(3), 3);
        assert_eq!(w.effective_count(30), 10);
    }
}
