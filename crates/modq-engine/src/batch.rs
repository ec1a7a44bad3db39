//! Batch operation coordinator.
//!
//! A batch moves a set of items to one target status as a single logical
//! operation. While a batch is in flight the coordinator is busy and every
//! further request is refused. Nothing is written to the store until the
//! batch resolves, so readers see pre-batch state for the whole latency
//! period.

use std::time::Duration;

use modq_core::{Error, ItemId, Result, Status};

use crate::clock::{Scheduler, Timer};
use crate::store::ItemStore;
use crate::undo::UndoSnapshot;

/// Where a resolved batch is committed before it is applied locally.
///
/// The reference behavior simulates the round trip and never fails; a real
/// asynchronous store plugs in here and reports failure as `Err`.
pub trait ModerationBackend {
    fn commit(&mut self, ids: &[ItemId], target: Status) -> Result<()>;
}

/// Backend that accepts every batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedBackend;

impl ModerationBackend for SimulatedBackend {
    fn commit(&mut self, _ids: &[ItemId], _target: Status) -> Result<()> {
        Ok(())
    }
}

/// Accepted batch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchTicket {
    pub batch: u64,
    pub target: Status,
    pub len: usize,
}

/// Result of a batch that reached its resolution point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every still-present item now has `target`; `snapshot` holds their
    /// prior statuses.
    Applied {
        target: Status,
        snapshot: UndoSnapshot,
    },
    /// The backend refused the batch; the store is unchanged.
    Failed { target: Status, reason: String },
}

#[derive(Debug)]
struct InFlight {
    batch: u64,
    ids: Vec<ItemId>,
    target: Status,
    /// Statuses of the known ids at the moment the batch was accepted.
    prior: Vec<(ItemId, Status)>,
}

#[derive(Debug, Default)]
pub struct BatchCoordinator {
    in_flight: Option<InFlight>,
    next_batch: u64,
}

impl BatchCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The loading lock.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Ids and target of the in-flight batch.
    #[must_use]
    pub fn in_flight(&self) -> Option<(&[ItemId], Status)> {
        self.in_flight
            .as_ref()
            .map(|f| (f.ids.as_slice(), f.target))
    }

    /// Take the loading lock, capture the pre-batch statuses from `store`
    /// and schedule resolution after `latency`.
    ///
    /// Refuses an empty id set and re-entrant calls without touching any
    /// state.
    pub fn begin(
        &mut self,
        ids: Vec<ItemId>,
        target: Status,
        store: &ItemStore,
        latency: Duration,
        scheduler: &mut Scheduler<Timer>,
    ) -> Result<BatchTicket> {
        if ids.is_empty() {
            return Err(Error::EmptySelection);
        }
        if self.is_busy() {
            return Err(Error::Busy("batch operation in flight"));
        }
        let prior = ids
            .iter()
            .filter_map(|&id| store.status(id).map(|status| (id, status)))
            .collect();
        self.next_batch += 1;
        let batch = self.next_batch;
        scheduler.schedule(latency, Timer::BatchResolve { batch });
        let ticket = BatchTicket {
            batch,
            target,
            len: ids.len(),
        };
        tracing::debug!(batch, %target, items = ids.len(), "batch started");
        self.in_flight = Some(InFlight {
            batch,
            ids,
            target,
            prior,
        });
        Ok(ticket)
    }

    /// Timer callback: commit through `backend`, then apply to `store`.
    ///
    /// The undo snapshot is the one captured by [`begin`](Self::begin), so
    /// writes made during the latency do not leak into it. The busy flag is released before this returns in both outcomes.
    /// Returns `None` if `batch` is not the one in flight.
    pub fn resolve(
        &mut self,
        batch: u64,
        store: &mut ItemStore,
        backend: &mut dyn ModerationBackend,
    ) -> Option<BatchOutcome> {
        if self.in_flight.as_ref().is_none_or(|f| f.batch != batch) {
            return None;
        }
        let InFlight {
            ids, target, prior, ..
        } = self.in_flight.take()?;

        if let Err(err) = backend.commit(&ids, target) {
            tracing::warn!(batch, %target, error = %err, "batch commit failed");
            return Some(BatchOutcome::Failed {
                target,
                reason: err.to_string(),
            });
        }

        let applied = ids
            .into_iter()
            .filter(|&id| store.transition(id, target).is_some())
            .count();
        tracing::info!(batch, %target, items = applied, "batch applied");
        Some(BatchOutcome::Applied {
            target,
            snapshot: UndoSnapshot::new(prior, target.variant()),
        })
    }
}
