//! `QueueEngine`: the facade a presentation layer drives.
//!
//! The engine owns every component and the virtual clock. Each public
//! operation mutates state synchronously, marks the change topics it
//! touched and flushes them to subscribers before returning. Latency is
//! modeled by timers that only fire inside [`QueueEngine::advance`] and
//! [`QueueEngine::run_until_idle`].

use std::fmt;
use std::time::Duration;

use indexmap::IndexSet;
use modq_core::{Config, Error, Item, ItemId, Result, Status, StatusCounts, Variant};
use serde::Serialize;

use crate::batch::{BatchCoordinator, BatchOutcome, BatchTicket, ModerationBackend, SimulatedBackend};
use crate::bus::{ChangeBus, SubscriptionId, Topic};
use crate::clock::{Scheduler, Timer};
use crate::focus::{FocusContext, FocusTarget};
use crate::keymap::{Command, KeyEvent, KeyScope};
use crate::navigator::{KeyIntent, Navigator};
use crate::notify::{Notification, NotificationChannel};
use crate::pagination::PaginationWindow;
use crate::selection::Selection;
use crate::store::ItemStore;
use crate::undo::{UndoBuffer, UndoHandle, UndoSnapshot};

pub const UNDO_MESSAGE: &str = "Action undone!";

const fn single_message(target: Status) -> &'static str {
    match target {
        Status::Approved => "Item approved",
        Status::Rejected => "Item rejected",
        Status::Pending => "Item set to pending",
    }
}

const fn batch_message(target: Status) -> &'static str {
    match target {
        Status::Approved => "Approved selected items.",
        Status::Rejected => "Rejected selected items.",
        Status::Pending => "Set selected items to pending.",
    }
}

const fn command_target(command: Command) -> Option<Status> {
    match command {
        Command::Approve => Some(Status::Approved),
        Command::Reject => Some(Status::Rejected),
        _ => None,
    }
}

fn log_refusal(result: Result<()>) {
    if let Err(err) = result {
        tracing::debug!(error = %err, "shortcut refused");
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// How [`QueueEngine::on_key`] disposed of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
    /// Bound in the live scope and acted on (possibly as a no-op).
    Handled,
    /// Not bound in the live scope, or nothing to act on.
    Ignored,
    /// A text field owns the keystroke.
    Suppressed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemState {
    pub id: ItemId,
    pub title: String,
    pub status: Status,
}

/// Serializable view of everything observable about the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineSnapshot {
    pub now_ms: u64,
    pub filter: Status,
    pub counts: StatusCounts,
    pub loaded_count: usize,
    pub visible: Vec<ItemId>,
    pub items: Vec<ItemState>,
    pub selection: Vec<ItemId>,
    pub focus_index: Option<usize>,
    pub detail_index: Option<usize>,
    pub focus_context: FocusContext,
    pub focused_control: FocusTarget,
    pub editing: bool,
    pub batch_busy: bool,
    pub growing: bool,
    pub confirm: Option<ItemId>,
    pub notification: Notification,
    pub undo: Option<UndoSnapshot>,
}

pub struct QueueEngine {
    config: Config,
    store: ItemStore,
    selection: Selection,
    window: PaginationWindow,
    batch: BatchCoordinator,
    undo: UndoBuffer,
    notifications: NotificationChannel,
    nav: Navigator,
    /// Item awaiting reject confirmation.
    confirm: Option<ItemId>,
    scheduler: Scheduler<Timer>,
    backend: Box<dyn ModerationBackend>,
    bus: ChangeBus,
}

impl fmt::Debug for QueueEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueEngine")
            .field("filter", &self.window.filter())
            .field("items", &self.store.len())
            .field("selected", &self.selection.len())
            .field("busy", &self.batch.is_busy())
            .field("now", &self.scheduler.now())
            .finish_non_exhaustive()
    }
}

impl QueueEngine {
    /// Seed an engine with `items`, showing the pending filter.
    pub fn new(items: Vec<Item>, config: Config) -> Result<Self> {
        let store = ItemStore::new(items)?;
        let window = PaginationWindow::new(Status::Pending, config.page_size);
        let mut engine = Self {
            config,
            store,
            selection: Selection::new(),
            window,
            batch: BatchCoordinator::new(),
            undo: UndoBuffer::new(),
            notifications: NotificationChannel::new(),
            nav: Navigator::new(),
            confirm: None,
            scheduler: Scheduler::new(),
            backend: Box::new(SimulatedBackend),
            bus: ChangeBus::new(),
        };
        engine.reconcile();
        engine.bus.flush();
        tracing::debug!(items = engine.store.len(), "queue engine ready");
        Ok(engine)
    }

    /// Commit batches through `backend` instead of the simulated round trip.
    #[must_use]
    pub fn with_backend(mut self, backend: impl ModerationBackend + 'static) -> Self {
        self.backend = Box::new(backend);
        self
    }

    fn finish<R>(&mut self, result: R) -> R {
        self.bus.flush();
        result
    }

    // ── Reads ────────────────────────────────────────────────────────

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn filter(&self) -> Status {
        self.window.filter()
    }

    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.store.get(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.store.iter()
    }

    #[must_use]
    pub fn status_counts(&self) -> StatusCounts {
        self.store.counts()
    }

    /// Visible items under `filter`, in report order.
    ///
    /// For the active filter this is the pagination window; any other
    /// filter is shown as it would be right after switching to it.
    #[must_use]
    pub fn get_visible_items(&self, filter: Status) -> Vec<&Item> {
        let filtered: Vec<&Item> = self.store.filtered(filter).collect();
        if filter == self.window.filter() {
            self.window.visible_slice(&filtered).to_vec()
        } else {
            filtered.into_iter().take(self.window.initial_size()).collect()
        }
    }

    #[must_use]
    pub fn visible_items(&self) -> Vec<&Item> {
        self.get_visible_items(self.filter())
    }

    fn filtered_len(&self) -> usize {
        self.store.count(self.filter())
    }

    fn visible_len(&self) -> usize {
        self.window.effective_count(self.filtered_len())
    }

    fn visible_item(&self, index: usize) -> Option<&Item> {
        if index >= self.visible_len() {
            return None;
        }
        self.store.filtered(self.filter()).nth(index)
    }

    /// Id of the visible item at `index` if it is pending.
    fn pending_at(&self, index: usize) -> Option<ItemId> {
        self.visible_item(index)
            .filter(|item| item.status == Status::Pending)
            .map(|item| item.id)
    }

    #[must_use]
    pub const fn loaded_count(&self) -> usize {
        self.window.loaded_count()
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.batch.is_busy()
    }

    #[must_use]
    pub const fn is_growing(&self) -> bool {
        self.window.is_growing()
    }

    #[must_use]
    pub const fn notification(&self) -> &Notification {
        self.notifications.current()
    }

    #[must_use]
    pub fn live_undo(&self) -> Option<&UndoSnapshot> {
        self.undo.live()
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.scheduler.now()
    }

    // ── Selection ────────────────────────────────────────────────────

    fn check_selectable(&self, id: ItemId) -> Result<()> {
        let status = self.store.status(id).ok_or(Error::ItemNotFound(id))?;
        if status != self.filter() {
            return Err(Error::InvalidArgument(format!(
                "item {id} is {status}, outside the {} view",
                self.filter()
            )));
        }
        Ok(())
    }

    /// Add `id` to the selection. Only items in the active filter qualify.
    pub fn select(&mut self, id: ItemId) -> Result<bool> {
        let result = self.check_selectable(id).map(|()| {
            let added = self.selection.insert(id);
            if added {
                self.bus.mark(Topic::Selection);
            }
            added
        });
        self.finish(result)
    }

    pub fn deselect(&mut self, id: ItemId) -> bool {
        let removed = self.selection.remove(id);
        if removed {
            self.bus.mark(Topic::Selection);
        }
        self.finish(removed)
    }

    /// Flip `id`; returns whether it is selected afterwards.
    pub fn toggle_select(&mut self, id: ItemId) -> Result<bool> {
        // Deselecting is always allowed; selecting must pass the filter check.
        let allowed = if self.selection.contains(id) {
            Ok(())
        } else {
            self.check_selectable(id)
        };
        let result = allowed.map(|()| self.selection.toggle(id));
        if result.is_ok() {
            self.bus.mark(Topic::Selection);
        }
        self.finish(result)
    }

    /// Switch to `filter` if needed and select every item it matches,
    /// loaded or not. Returns the number of ids added.
    pub fn select_all(&mut self, filter: Status) -> usize {
        self.switch_filter(filter);
        let mut added = 0;
        for id in self.store.filtered_ids(filter) {
            if self.selection.insert(id) {
                added += 1;
            }
        }
        if added > 0 {
            self.bus.mark(Topic::Selection);
        }
        self.finish(added)
    }

    pub fn clear_selection(&mut self) -> bool {
        let cleared = self.selection.clear();
        if cleared {
            self.bus.mark(Topic::Selection);
        }
        self.finish(cleared)
    }

    #[must_use]
    pub fn selection(&self) -> Vec<ItemId> {
        self.selection.to_vec()
    }

    #[must_use]
    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selection.contains(id)
    }

    /// True iff the active filter matches something and all of it is selected.
    #[must_use]
    pub fn is_all_selected(&self) -> bool {
        let mut filtered = self.store.filtered(self.filter()).peekable();
        filtered.peek().is_some() && filtered.all(|item| self.selection.contains(item.id))
    }

    // ── Batch operations ─────────────────────────────────────────────

    /// Start a batch moving `ids` to `target`.
    ///
    /// Nothing changes until the batch resolves on the clock. Refused with
    /// [`Error::EmptySelection`] or [`Error::Busy`] and no side effects.
    pub fn apply_batch(
        &mut self,
        ids: impl IntoIterator<Item = ItemId>,
        target: Status,
    ) -> Result<BatchTicket> {
        let ids: IndexSet<ItemId> = ids.into_iter().collect();
        let result = self.batch.begin(
            ids.into_iter().collect(),
            target,
            &self.store,
            self.config.batch_latency,
            &mut self.scheduler,
        );
        match &result {
            Ok(_) => self.bus.mark(Topic::Busy),
            Err(err) => tracing::debug!(error = %err, %target, "batch refused"),
        }
        self.finish(result)
    }

    pub fn apply_batch_to_selection(&mut self, target: Status) -> Result<BatchTicket> {
        self.apply_batch(self.selection.to_vec(), target)
    }

    /// Whether the batch affordances are enabled.
    #[must_use]
    pub fn can_apply_batch(&self) -> bool {
        !self.selection.is_empty() && !self.batch.is_busy()
    }

    /// Batch targets offered under the active filter.
    #[must_use]
    pub const fn batch_actions(&self) -> &'static [Status] {
        match self.window.filter() {
            Status::Pending => &[Status::Approved, Status::Rejected],
            Status::Approved | Status::Rejected => &[Status::Pending],
        }
    }

    fn resolve_batch(&mut self, batch: u64) {
        let Some(outcome) = self
            .batch
            .resolve(batch, &mut self.store, self.backend.as_mut())
        else {
            return;
        };
        self.bus.mark(Topic::Busy);
        match outcome {
            BatchOutcome::Applied { target, snapshot } => {
                // A completed batch always supersedes the previous snapshot,
                // even when none of its ids still exist.
                let handle = if snapshot.is_empty() {
                    self.undo.discard(&mut self.scheduler);
                    None
                } else {
                    Some(self.undo.record(
                        snapshot,
                        self.config.undo_window,
                        &mut self.scheduler,
                    ))
                };
                self.publish(batch_message(target), target.variant(), handle);
                if self.selection.clear() {
                    self.bus.mark(Topic::Selection);
                }
                self.bus.mark(Topic::Items);
            }
            BatchOutcome::Failed { reason, .. } => {
                self.publish(
                    format!("Could not update selected items: {reason}"),
                    Variant::Error,
                    None,
                );
            }
        }
        self.reconcile();
    }

    // ── Single-item transitions ──────────────────────────────────────

    /// Move one item along an operator affordance, with undo and a
    /// notification.
    pub fn transition_one(&mut self, id: ItemId, target: Status) -> Result<()> {
        let result = self.apply_single(id, target);
        self.finish(result)
    }

    fn apply_single(&mut self, id: ItemId, target: Status) -> Result<()> {
        let from = self.store.status(id).ok_or(Error::ItemNotFound(id))?;
        if !from.can_transition_to(target) {
            return Err(Error::InvalidTransition { from, to: target });
        }
        self.store.transition(id, target);
        let handle = self.undo.record(
            UndoSnapshot::new(vec![(id, from)], target.variant()),
            self.config.undo_window,
            &mut self.scheduler,
        );
        self.publish(single_message(target), target.variant(), Some(handle));
        self.bus.mark(Topic::Items);
        self.reconcile();
        Ok(())
    }

    /// Reject through the row affordance.
    ///
    /// Returns `Ok(true)` when a confirmation was opened, `Ok(false)` when
    /// confirmation is disabled and the item was rejected directly.
    pub fn request_reject(&mut self, id: ItemId) -> Result<bool> {
        let result = self.ask_reject(id);
        self.finish(result)
    }

    fn ask_reject(&mut self, id: ItemId) -> Result<bool> {
        let from = self.store.status(id).ok_or(Error::ItemNotFound(id))?;
        if !from.can_transition_to(Status::Rejected) {
            return Err(Error::InvalidTransition {
                from,
                to: Status::Rejected,
            });
        }
        if !self.config.confirm_single_reject {
            self.apply_single(id, Status::Rejected)?;
            return Ok(false);
        }
        self.confirm = Some(id);
        self.nav.open_confirm();
        self.bus.mark(Topic::Confirm);
        self.bus.mark(Topic::Focus);
        Ok(true)
    }

    /// Perform the pending reject. `Ok(false)` if none was pending.
    pub fn confirm(&mut self) -> Result<bool> {
        let result = self.confirm_reject();
        self.finish(result)
    }

    fn confirm_reject(&mut self) -> Result<bool> {
        let Some(id) = self.take_confirm() else {
            return Ok(false);
        };
        self.apply_single(id, Status::Rejected).map(|()| true)
    }

    pub fn cancel_confirm(&mut self) -> bool {
        let cancelled = self.take_confirm().is_some();
        self.finish(cancelled)
    }

    fn take_confirm(&mut self) -> Option<ItemId> {
        let id = self.confirm.take()?;
        self.nav.close_confirm();
        self.bus.mark(Topic::Confirm);
        self.bus.mark(Topic::Focus);
        Some(id)
    }

    #[must_use]
    pub const fn pending_confirmation(&self) -> Option<ItemId> {
        self.confirm
    }

    // ── Undo and notifications ───────────────────────────────────────

    /// Revert the live snapshot. Returns whether one existed.
    pub fn undo(&mut self) -> bool {
        let reverted = self.revert_live();
        self.finish(reverted)
    }

    fn revert_live(&mut self) -> bool {
        if self
            .undo
            .revert(&mut self.store, &mut self.scheduler)
            .is_none()
        {
            return false;
        }
        self.publish(UNDO_MESSAGE, Variant::Success, None);
        self.bus.mark(Topic::Items);
        self.reconcile();
        true
    }

    /// The notification's undo control: close it, then undo if its handle
    /// still names the live snapshot.
    pub fn invoke_notification_undo(&mut self) -> bool {
        let Some(handle) = self.notifications.current().undo else {
            return false;
        };
        self.notifications.close(&mut self.scheduler);
        self.bus.mark(Topic::Notification);
        let reverted = self.undo.is_live(handle) && self.revert_live();
        self.finish(reverted)
    }

    pub fn close_notification(&mut self) -> bool {
        let closed = self.notifications.close(&mut self.scheduler);
        if closed {
            self.bus.mark(Topic::Notification);
        }
        self.finish(closed)
    }

    fn publish(&mut self, message: impl Into<String>, variant: Variant, undo: Option<UndoHandle>) {
        self.notifications.notify(
            message,
            variant,
            undo,
            self.config.notify_duration,
            &mut self.scheduler,
        );
        self.bus.mark(Topic::Notification);
    }

    // ── Focus and detail view ────────────────────────────────────────

    pub fn set_focus(&mut self, index: usize) -> bool {
        let changed = self.nav.set_focus(index, self.visible_len());
        if changed {
            self.bus.mark(Topic::Focus);
        }
        self.finish(changed)
    }

    /// Move focus by `delta`, clamped to the visible slice.
    pub fn move_focus(&mut self, delta: isize) -> bool {
        let changed = self.nav.move_focus(delta, self.visible_len());
        if changed {
            self.bus.mark(Topic::Focus);
        }
        self.finish(changed)
    }

    #[must_use]
    pub const fn focus_index(&self) -> Option<usize> {
        self.nav.focus_index()
    }

    #[must_use]
    pub fn focused_item(&self) -> Option<&Item> {
        self.nav.focus_index().and_then(|i| self.visible_item(i))
    }

    #[must_use]
    pub fn focus_context(&self) -> FocusContext {
        self.nav.focus().context()
    }

    #[must_use]
    pub const fn focused_control(&self) -> FocusTarget {
        self.nav.focused_control()
    }

    pub fn open_detail(&mut self, index: usize) -> Result<()> {
        let result = self.open_detail_at(index);
        self.finish(result)
    }

    fn open_detail_at(&mut self, index: usize) -> Result<()> {
        let len = self.visible_len();
        let status = self.visible_item(index).map(|item| item.status).ok_or_else(|| {
            Error::InvalidArgument(format!("detail index {index} outside visible slice of {len}"))
        })?;
        self.take_confirm();
        self.nav.open_detail(index, len, status);
        self.bus.mark(Topic::Detail);
        self.bus.mark(Topic::Focus);
        Ok(())
    }

    pub fn close_detail(&mut self) -> bool {
        let closed = self.close_detail_view();
        self.finish(closed)
    }

    fn close_detail_view(&mut self) -> bool {
        let closed = self.nav.close_detail();
        if closed {
            self.bus.mark(Topic::Detail);
            self.bus.mark(Topic::Focus);
        }
        closed
    }

    /// Move the detail pointer by `delta` within the slice, without closing.
    pub fn move_detail(&mut self, delta: isize) -> bool {
        let moved = self.step_detail(delta);
        self.finish(moved)
    }

    fn step_detail(&mut self, delta: isize) -> bool {
        let len = self.visible_len();
        let filter = self.window.filter();
        let store = &self.store;
        let moved = self.nav.move_detail(delta, len, |index| {
            store.filtered(filter).nth(index).map(|item| item.status)
        });
        if moved {
            self.bus.mark(Topic::Detail);
            self.bus.mark(Topic::Focus);
        }
        moved
    }

    #[must_use]
    pub const fn detail_index(&self) -> Option<usize> {
        self.nav.detail_index()
    }

    #[must_use]
    pub fn detail_item(&self) -> Option<&Item> {
        self.nav.detail_index().and_then(|i| self.visible_item(i))
    }

    /// Whether an editable field owns keyboard input.
    pub fn set_editing(&mut self, editing: bool) {
        if self.nav.is_editing() != editing {
            self.nav.set_editing(editing);
            self.bus.mark(Topic::Focus);
        }
        self.finish(());
    }

    // ── Keyboard dispatch ────────────────────────────────────────────

    /// Single keyboard entry point.
    pub fn on_key(&mut self, event: KeyEvent) -> Dispatch {
        let dispatch = match self.nav.interpret(event) {
            KeyIntent::Suppressed => Dispatch::Suppressed,
            KeyIntent::Unbound => Dispatch::Ignored,
            KeyIntent::Command(KeyScope::List, command) => self.run_list_command(command),
            KeyIntent::Command(KeyScope::Detail, command) => self.run_detail_command(command),
            KeyIntent::Command(KeyScope::Confirm, command) => self.run_confirm_command(command),
        };
        tracing::debug!(key = %event, ?dispatch, "key dispatched");
        self.finish(dispatch)
    }

    fn run_list_command(&mut self, command: Command) -> Dispatch {
        let len = self.visible_len();
        let Some(index) = self.nav.focus_index().filter(|_| len > 0) else {
            return Dispatch::Ignored;
        };
        match command {
            Command::FocusNext | Command::FocusPrev => {
                let delta = if command == Command::FocusNext { 1 } else { -1 };
                if self.nav.move_focus(delta, len) {
                    self.bus.mark(Topic::Focus);
                }
            }
            Command::OpenDetail => {
                if let Err(err) = self.open_detail_at(index) {
                    tracing::debug!(error = %err, "open detail refused");
                }
            }
            Command::Approve | Command::Reject => {
                if let (Some(id), Some(target)) = (self.pending_at(index), command_target(command))
                {
                    log_refusal(self.apply_single(id, target));
                }
            }
            Command::ClearSelection => {
                if self.selection.clear() {
                    self.bus.mark(Topic::Selection);
                }
                if self.nav.set_focus(0, len) {
                    self.bus.mark(Topic::Focus);
                }
            }
            _ => return Dispatch::Ignored,
        }
        Dispatch::Handled
    }

    fn run_detail_command(&mut self, command: Command) -> Dispatch {
        match command {
            Command::CloseDetail => {
                self.close_detail_view();
            }
            Command::Approve | Command::Reject => {
                let pending = self.nav.detail_index().and_then(|i| self.pending_at(i));
                if let (Some(id), Some(target)) = (pending, command_target(command)) {
                    log_refusal(self.apply_single(id, target));
                    self.close_detail_view();
                }
            }
            Command::DetailPrev => {
                self.step_detail(-1);
            }
            Command::DetailNext => {
                self.step_detail(1);
            }
            Command::CycleForward | Command::CycleBackward => {
                if self.nav.cycle(command == Command::CycleBackward) {
                    self.bus.mark(Topic::Focus);
                }
            }
            Command::Activate => self.activate_detail_control(),
            _ => return Dispatch::Ignored,
        }
        Dispatch::Handled
    }

    fn activate_detail_control(&mut self) {
        match self.nav.focused_control() {
            FocusTarget::PrevButton => {
                self.step_detail(-1);
            }
            FocusTarget::NextButton => {
                self.step_detail(1);
            }
            control if control.closes_detail() => {
                self.close_detail_view();
            }
            control => {
                let item = self.detail_item().map(|item| item.id);
                if let (Some(target), Some(id)) = (control.action(), item) {
                    log_refusal(self.apply_single(id, target));
                    self.close_detail_view();
                }
            }
        }
    }

    fn run_confirm_command(&mut self, command: Command) -> Dispatch {
        match command {
            Command::Confirm => {
                let result = self.confirm_reject();
                log_refusal(result.map(|_| ()));
            }
            Command::Cancel => {
                self.take_confirm();
            }
            Command::CycleForward | Command::CycleBackward => {
                if self.nav.cycle(command == Command::CycleBackward) {
                    self.bus.mark(Topic::Focus);
                }
            }
            Command::Activate => match self.nav.focused_control() {
                FocusTarget::ConfirmYes => {
                    let result = self.confirm_reject();
                    log_refusal(result.map(|_| ()));
                }
                FocusTarget::ConfirmNo => {
                    self.take_confirm();
                }
                _ => {}
            },
            _ => return Dispatch::Ignored,
        }
        Dispatch::Handled
    }

    // ── Filter and pagination ────────────────────────────────────────

    /// Switch the status tab. Returns `false` if `filter` was already active.
    pub fn set_filter(&mut self, filter: Status) -> bool {
        let changed = self.switch_filter(filter);
        self.finish(changed)
    }

    fn switch_filter(&mut self, filter: Status) -> bool {
        if !self.window.set_filter(filter) {
            return false;
        }
        tracing::debug!(%filter, "filter changed");
        if self.selection.clear() {
            self.bus.mark(Topic::Selection);
        }
        self.take_confirm();
        self.close_detail_view();
        self.bus.mark(Topic::Window);
        self.bus.mark(Topic::Items);
        self.reconcile();
        true
    }

    /// Request `step` more items. Collapses into an in-flight grow.
    pub fn grow_by(&mut self, step: usize) -> bool {
        let started = self.request_grow(step);
        self.finish(started)
    }

    fn request_grow(&mut self, step: usize) -> bool {
        let started = self
            .window
            .grow_by(step, self.config.grow_latency, &mut self.scheduler);
        if started {
            self.bus.mark(Topic::Busy);
        }
        started
    }

    /// Whether the load-more affordance is enabled.
    #[must_use]
    pub fn can_load_more(&self) -> bool {
        self.window.has_more(self.filtered_len()) && !self.window.is_growing()
    }

    /// Manual load-more.
    pub fn load_more(&mut self) -> bool {
        let started = self.grow_if_more("manual");
        self.finish(started)
    }

    /// The end-of-list sentinel became visible.
    pub fn on_sentinel_visible(&mut self) -> bool {
        let started = self.grow_if_more("sentinel");
        self.finish(started)
    }

    fn grow_if_more(&mut self, trigger: &'static str) -> bool {
        if !self.window.has_more(self.filtered_len()) {
            return false;
        }
        let started = self.request_grow(self.config.page_step);
        tracing::debug!(trigger, started, "load more requested");
        started
    }

    fn resolve_grow(&mut self) {
        if self.window.resolve_grow(self.filtered_len()).is_some() {
            self.bus.mark(Topic::Window);
            self.bus.mark(Topic::Items);
        }
        self.bus.mark(Topic::Busy);
        self.reconcile();
    }

    // ── Clock ────────────────────────────────────────────────────────

    /// Advance the virtual clock by `by`, firing every timer that falls due,
    /// including timers armed by earlier timers in the same window.
    pub fn advance(&mut self, by: Duration) {
        let until = self.scheduler.now().saturating_add(by);
        while let Some(timer) = self.scheduler.pop_due(until) {
            self.fire(timer);
        }
        self.scheduler.settle(until);
        self.bus.flush();
    }

    /// Fire timers until none remain. Returns the virtual time that passed.
    pub fn run_until_idle(&mut self) -> Duration {
        let start = self.scheduler.now();
        while let Some(deadline) = self.scheduler.next_deadline() {
            while let Some(timer) = self.scheduler.pop_due(deadline) {
                self.fire(timer);
            }
        }
        self.bus.flush();
        self.scheduler.now().saturating_sub(start)
    }

    fn fire(&mut self, timer: Timer) {
        match timer {
            Timer::BatchResolve { batch } => self.resolve_batch(batch),
            Timer::GrowResolve => self.resolve_grow(),
            Timer::UndoExpiry { generation } => {
                if self.undo.expire(generation) {
                    self.bus.mark(Topic::Notification);
                }
            }
            Timer::NotificationClose { generation } => {
                if self.notifications.auto_close(generation) {
                    self.bus.mark(Topic::Notification);
                }
            }
        }
    }

    // ── Invariants ───────────────────────────────────────────────────

    /// Restore the cross-component invariants after any store or window
    /// change: selection within the filter, focus and detail pointer inside
    /// the visible slice, confirmation only for a pending item.
    fn reconcile(&mut self) {
        let filter = self.window.filter();
        let store = &self.store;
        if self.selection.retain(|id| store.status(id) == Some(filter)) > 0 {
            self.bus.mark(Topic::Selection);
        }

        let len = self.visible_len();
        let (focus_changed, detail_changed) = self.nav.clamp(len);
        if focus_changed {
            self.bus.mark(Topic::Focus);
        }
        if detail_changed {
            self.bus.mark(Topic::Detail);
        }
        let detail_status = self
            .nav
            .detail_index()
            .and_then(|i| self.visible_item(i))
            .map(|item| item.status);
        if let Some(status) = detail_status {
            self.nav.refresh_detail_ring(len, status);
        }

        if let Some(id) = self.confirm {
            let still_valid =
                self.nav.is_confirming() && self.store.status(id) == Some(Status::Pending);
            if !still_valid {
                self.confirm = None;
                self.nav.close_confirm();
                self.bus.mark(Topic::Confirm);
            }
        }
    }

    // ── Subscriptions and snapshots ──────────────────────────────────

    /// Call `callback` with the changed topics after every operation that
    /// touches one of `topics`.
    pub fn subscribe(
        &mut self,
        topics: impl IntoIterator<Item = Topic>,
        callback: impl FnMut(&[Topic]) + 'static,
    ) -> SubscriptionId {
        self.bus.subscribe(topics, Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            now_ms: millis(self.scheduler.now()),
            filter: self.filter(),
            counts: self.store.counts(),
            loaded_count: self.window.loaded_count(),
            visible: self.visible_items().iter().map(|item| item.id).collect(),
            items: self
                .store
                .iter()
                .map(|item| ItemState {
                    id: item.id,
                    title: item.title.clone(),
                    status: item.status,
                })
                .collect(),
            selection: self.selection.to_vec(),
            focus_index: self.nav.focus_index(),
            detail_index: self.nav.detail_index(),
            focus_context: self.focus_context(),
            focused_control: self.nav.focused_control(),
            editing: self.nav.is_editing(),
            batch_busy: self.batch.is_busy(),
            growing: self.window.is_growing(),
            confirm: self.confirm,
            notification: self.notifications.current().clone(),
            undo: self.undo.live().cloned(),
        }
    }
}
