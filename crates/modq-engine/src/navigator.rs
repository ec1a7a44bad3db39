//! Keyboard focus and detail-view pointer over the visible slice.
//!
//! The navigator owns positional state only. It never reads the store: the
//! engine passes the visible slice length (and the status of the item under
//! the detail pointer) whenever a position has to be validated.

use modq_core::Status;

use crate::focus::{FocusContext, FocusManager, FocusTarget, confirm_ring, detail_ring};
use crate::keymap::{self, Command, KeyEvent, KeyScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIntent {
    /// An editable field owns the keystroke.
    Suppressed,
    /// Nothing is bound to this key in the live scope.
    Unbound,
    Command(KeyScope, Command),
}

#[derive(Debug, Default)]
pub struct Navigator {
    focus_index: Option<usize>,
    detail: Option<usize>,
    editing: bool,
    focus: FocusManager,
}

const fn clamp_index(index: usize, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else if index >= len {
        Some(len - 1)
    } else {
        Some(index)
    }
}

fn offset(index: usize, delta: isize, len: usize) -> Option<usize> {
    clamp_index(index.saturating_add_signed(delta), len)
}

impl Navigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Focused position in a slice of `len` items.
    #[must_use]
    pub const fn focus_index(&self) -> Option<usize> {
        self.focus_index
    }

    #[must_use]
    pub const fn detail_index(&self) -> Option<usize> {
        self.detail
    }

    #[must_use]
    pub const fn is_detail_open(&self) -> bool {
        self.detail.is_some()
    }

    #[must_use]
    pub fn is_confirming(&self) -> bool {
        self.focus.context() == FocusContext::Confirm
    }

    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.editing
    }

    pub const fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    #[must_use]
    pub const fn focus(&self) -> &FocusManager {
        &self.focus
    }

    #[must_use]
    pub fn scope(&self) -> KeyScope {
        match self.focus.context() {
            FocusContext::Screen => KeyScope::List,
            FocusContext::Detail => KeyScope::Detail,
            FocusContext::Confirm => KeyScope::Confirm,
        }
    }

    /// Map a raw key event to a command of the live scope.
    #[must_use]
    pub fn interpret(&self, event: KeyEvent) -> KeyIntent {
        if self.editing {
            return KeyIntent::Suppressed;
        }
        let scope = self.scope();
        keymap::resolve(scope, event).map_or(KeyIntent::Unbound, |cmd| {
            KeyIntent::Command(scope, cmd)
        })
    }

    // ── List focus ───────────────────────────────────────────────────

    /// Focus `index`, clamped into the slice. Returns `true` if it changed.
    pub fn set_focus(&mut self, index: usize, len: usize) -> bool {
        let next = clamp_index(index, len);
        let changed = next != self.focus_index;
        self.focus_index = next;
        changed
    }

    /// Move focus by `delta`, clamped at both ends (never wraps).
    pub fn move_focus(&mut self, delta: isize, len: usize) -> bool {
        let next = offset(self.focus_index.unwrap_or(0), delta, len);
        let changed = next != self.focus_index;
        self.focus_index = next;
        changed
    }

    // ── Detail view ──────────────────────────────────────────────────

    /// Open the detail view on `index`. The caller has checked the bound.
    pub fn open_detail(&mut self, index: usize, len: usize, status: Status) {
        if self.detail.is_some() {
            self.focus.pop_to_below(FocusContext::Detail);
        }
        self.detail = Some(index);
        self.focus
            .push_context(FocusContext::Detail, detail_ring(index, len, status));
    }

    /// Returns `false` if the view was not open.
    pub fn close_detail(&mut self) -> bool {
        if self.detail.take().is_none() {
            return false;
        }
        self.focus.pop_to_below(FocusContext::Detail);
        true
    }

    /// Move the detail pointer by `delta`, clamped at the slice ends.
    ///
    /// `status_at` yields the status of the item at the new position so the
    /// action controls can be rebuilt.
    pub fn move_detail(
        &mut self,
        delta: isize,
        len: usize,
        status_at: impl Fn(usize) -> Option<Status>,
    ) -> bool {
        let Some(current) = self.detail else {
            return false;
        };
        let Some(next) = offset(current, delta, len) else {
            return false;
        };
        if next == current {
            return false;
        }
        self.detail = Some(next);
        if let Some(status) = status_at(next) {
            self.refresh_detail_ring(len, status);
        }
        true
    }

    /// Rebuild the detail ring after the slice or the item's status changed.
    pub fn refresh_detail_ring(&mut self, len: usize, status: Status) {
        if let (Some(index), FocusContext::Detail) = (self.detail, self.focus.context()) {
            self.focus.set_focus_ring(detail_ring(index, len, status));
        }
    }

    pub fn cycle(&mut self, backward: bool) -> bool {
        self.focus.handle_tab(backward)
    }

    #[must_use]
    pub const fn focused_control(&self) -> FocusTarget {
        self.focus.current()
    }

    // ── Confirmation ─────────────────────────────────────────────────

    pub fn open_confirm(&mut self) {
        if !self.is_confirming() {
            self.focus.push_context(FocusContext::Confirm, confirm_ring());
        }
    }

    pub fn close_confirm(&mut self) -> bool {
        if !self.is_confirming() {
            return false;
        }
        self.focus.pop_context();
        true
    }

    /// Re-establish the focus and detail invariants against a slice of
    /// `len` items. Closes the detail view if the slice became empty.
    ///
    /// Returns `(focus_changed, detail_changed)`.
    pub fn clamp(&mut self, len: usize) -> (bool, bool) {
        let focus = clamp_index(self.focus_index.unwrap_or(0), len);
        let focus_changed = focus != self.focus_index;
        self.focus_index = focus;

        let detail_changed = match self.detail {
            Some(_) if len == 0 => self.close_detail(),
            Some(index) if index >= len => {
                self.detail = Some(len - 1);
                true
            }
            _ => false,
        };
        (focus_changed, detail_changed)
    }
}
