//! Undo buffer: one live snapshot with a timed expiry.
//!
//! At most one snapshot is live and at most one expiry timer is armed.
//! Recording a new snapshot cancels the previous timer and discards the
//! previous snapshot for good.

use std::time::Duration;

use modq_core::{ItemId, Status, Variant};
use serde::Serialize;

use crate::clock::{Scheduler, TaskId, Timer};
use crate::store::ItemStore;

/// Prior statuses of the items touched by one transition-producing operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndoSnapshot {
    pub entries: Vec<(ItemId, Status)>,
    pub variant: Variant,
}

impl UndoSnapshot {
    #[must_use]
    pub const fn new(entries: Vec<(ItemId, Status)>, variant: Variant) -> Self {
        Self { entries, variant }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Names one recorded snapshot. Stale handles never revert anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct UndoHandle {
    generation: u64,
}

#[derive(Debug)]
struct LiveSnapshot {
    snapshot: UndoSnapshot,
    generation: u64,
    expiry: TaskId,
}

#[derive(Debug, Default)]
pub struct UndoBuffer {
    live: Option<LiveSnapshot>,
    generation: u64,
}

impl UndoBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `snapshot` as the live one and arm its expiry.
    pub fn record(
        &mut self,
        snapshot: UndoSnapshot,
        window: Duration,
        scheduler: &mut Scheduler<Timer>,
    ) -> UndoHandle {
        self.discard(scheduler);
        self.generation += 1;
        let generation = self.generation;
        let expiry = scheduler.schedule(window, Timer::UndoExpiry { generation });
        tracing::debug!(generation, items = snapshot.len(), "undo snapshot recorded");
        self.live = Some(LiveSnapshot {
            snapshot,
            generation,
            expiry,
        });
        UndoHandle { generation }
    }

    /// Replay the live snapshot into `store` and clear it.
    ///
    /// Returns the reverted snapshot, or `None` when nothing was live.
    pub fn revert(
        &mut self,
        store: &mut ItemStore,
        scheduler: &mut Scheduler<Timer>,
    ) -> Option<UndoSnapshot> {
        let live = self.live.take()?;
        scheduler.cancel(live.expiry);
        for &(id, prior) in &live.snapshot.entries {
            store.transition(id, prior);
        }
        tracing::info!(
            generation = live.generation,
            items = live.snapshot.len(),
            "undo reverted"
        );
        Some(live.snapshot)
    }

    /// Timer callback: drop the snapshot if `generation` is still the live one.
    pub fn expire(&mut self, generation: u64) -> bool {
        if self.live.as_ref().is_some_and(|l| l.generation == generation) {
            self.live = None;
            tracing::debug!(generation, "undo snapshot expired");
            true
        } else {
            false
        }
    }

    /// Drop the live snapshot (if any) and cancel its timer.
    pub fn discard(&mut self, scheduler: &mut Scheduler<Timer>) -> bool {
        match self.live.take() {
            Some(live) => {
                scheduler.cancel(live.expiry);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn live(&self) -> Option<&UndoSnapshot> {
        self.live.as_ref().map(|l| &l.snapshot)
    }

    #[must_use]
    pub fn is_live(&self, handle: UndoHandle) -> bool {
        self.live
            .as_ref()
            .is_some_and(|l| l.generation == handle.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modq_core::Item;

    const WINDOW: Duration = Duration::from_millis(3500);

    fn fixture() -> (UndoBuffer, ItemStore, Scheduler<Timer>) {
        let store = ItemStore::new(vec![Item::new(1, "a"), Item::new(2, "b")]).unwrap();
        (UndoBuffer::new(), store, Scheduler::new())
    }

    fn fire(buf: &mut UndoBuffer, sched: &mut Scheduler<Timer>, by: Duration) {
        for timer in sched.advance(by) {
            if let Timer::UndoExpiry { generation } = timer {
                buf.expire(generation);
            }
        }
    }

    #[test]
    fn revert_replays_prior_statuses_once() {
        let (mut buf, mut store, mut sched) = fixture();
        store.transition(ItemId(1), Status::Approved);
        buf.record(
            UndoSnapshot::new(vec![(ItemId(1), Status::Pending)], Variant::Success),
            WINDOW,
            &mut sched,
        );
        let reverted = buf.revert(&mut store, &mut sched).unwrap();
        assert_eq!(reverted.len(), 1);
        assert_eq!(store.status(ItemId(1)), Some(Status::Pending));
        assert!(buf.revert(&mut store, &mut sched).is_none());
        assert!(sched.is_empty(), "expiry timer is cancelled on revert");
    }

    #[test]
    fn expiry_discards_silently() {
        let (mut buf, mut store, mut sched) = fixture();
        store.transition(ItemId(2), Status::Rejected);
        buf.record(
            UndoSnapshot::new(vec![(ItemId(2), Status::Pending)], Variant::Error),
            WINDOW,
            &mut sched,
        );
        fire(&mut buf, &mut sched, WINDOW - Duration::from_millis(1));
        assert!(buf.live().is_some());
        fire(&mut buf, &mut sched, Duration::from_millis(1));
        assert!(buf.live().is_none());
        assert_eq!(store.status(ItemId(2)), Some(Status::Rejected));
    }

    #[test]
    fn new_snapshot_supersedes_old_and_its_timer() {
        let (mut buf, _store, mut sched) = fixture();
        let first = buf.record(
            UndoSnapshot::new(vec![(ItemId(1), Status::Pending)], Variant::Success),
            WINDOW,
            &mut sched,
        );
        fire(&mut buf, &mut sched, Duration::from_millis(3000));
        let second = buf.record(
            UndoSnapshot::new(vec![(ItemId(2), Status::Pending)], Variant::Info),
            WINDOW,
            &mut sched,
        );
        assert_eq!(sched.len(), 1, "only one expiry timer is ever armed");
        assert!(!buf.is_live(first));
        assert!(buf.is_live(second));

        // The first window would have ended here; the second must survive it.
        fire(&mut buf, &mut sched, Duration::from_millis(600));
        assert!(buf.is_live(second));
        fire(&mut buf, &mut sched, Duration::from_millis(2900));
        assert!(buf.live().is_none());
    }

    #[test]
    fn stale_expiry_generation_is_ignored() {
        let (mut buf, _store, mut sched) = fixture();
        buf.record(UndoSnapshot::new(vec![], Variant::Info), WINDOW, &mut sched);
        assert!(!buf.expire(99));
        assert!(buf.live().is_some());
    }
}
