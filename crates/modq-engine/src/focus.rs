//! Focus tracking for the list screen and its overlays.
//!
//! Focus is organized hierarchically:
//! - **FocusContext**: the active scope (list screen, detail view, confirmation)
//! - **FocusTarget**: one focusable control within that scope
//! - **focus ring**: the ordered, enabled controls that `Tab` cycles through
//!
//! Opening the detail view or a confirmation pushes a context; the previous
//! context and target are restored when it is popped. Overlay contexts trap
//! focus: `Tab`/`BackTab` wrap inside their ring instead of leaving it.

use modq_core::Status;
use serde::Serialize;

// ──────────────────────────────────────────────────────────────────────
// FocusTarget: identifies a focusable control
// ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusTarget {
    /// The item list itself (arrow-key navigation).
    List,
    /// Detail view: previous item.
    PrevButton,
    /// Detail view: next item.
    NextButton,
    /// Detail view: the close glyph in the header.
    CloseIcon,
    Approve,
    Reject,
    SetPending,
    /// Detail view: the close button below the actions.
    CloseButton,
    ConfirmYes,
    ConfirmNo,
    #[default]
    None,
}

impl FocusTarget {
    /// The status this control moves the current item to, if any.
    #[must_use]
    pub const fn action(self) -> Option<Status> {
        match self {
            Self::Approve => Some(Status::Approved),
            Self::Reject => Some(Status::Rejected),
            Self::SetPending => Some(Status::Pending),
            _ => None,
        }
    }

    #[must_use]
    pub const fn closes_detail(self) -> bool {
        matches!(self, Self::CloseIcon | Self::CloseButton)
    }
}

// ──────────────────────────────────────────────────────────────────────
// FocusContext: the current focus scope
// ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusContext {
    #[default]
    Screen,
    /// Single-item detail view is open.
    Detail,
    /// A reject confirmation is awaiting an answer.
    Confirm,
}

impl FocusContext {
    /// Check if this context traps focus (blocks list input).
    #[must_use]
    pub const fn traps_focus(self) -> bool {
        !matches!(self, Self::Screen)
    }

    /// Check if list-level shortcuts are live in this context.
    #[must_use]
    pub const fn allows_shortcuts(self) -> bool {
        matches!(self, Self::Screen)
    }

    const fn default_target(self) -> Option<FocusTarget> {
        match self {
            Self::Screen => None,
            Self::Detail => Some(FocusTarget::CloseIcon),
            Self::Confirm => Some(FocusTarget::ConfirmYes),
        }
    }
}

#[derive(Debug, Clone)]
struct FocusSnapshot {
    context: FocusContext,
    target: FocusTarget,
    ring: Vec<FocusTarget>,
}

// ──────────────────────────────────────────────────────────────────────
// FocusManager
// ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FocusManager {
    context: FocusContext,
    current: FocusTarget,
    ring: Vec<FocusTarget>,
    snapshot_stack: Vec<FocusSnapshot>,
}

impl Default for FocusManager {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusManager {
    /// List screen context, focus on the list.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ring(vec![FocusTarget::List])
    }

    #[must_use]
    pub fn with_ring(ring: Vec<FocusTarget>) -> Self {
        let current = ring.first().copied().unwrap_or_default();
        Self {
            context: FocusContext::Screen,
            current,
            ring,
            snapshot_stack: Vec::new(),
        }
    }

    // ── Getters ──────────────────────────────────────────────────────

    #[must_use]
    pub const fn context(&self) -> FocusContext {
        self.context
    }

    #[must_use]
    pub const fn current(&self) -> FocusTarget {
        self.current
    }

    #[must_use]
    pub const fn is_trapped(&self) -> bool {
        self.context.traps_focus()
    }

    #[must_use]
    pub fn focus_ring(&self) -> &[FocusTarget] {
        &self.ring
    }

    // ── Focus ring management ────────────────────────────────────────

    /// Replace the ring of the active context.
    ///
    /// Keeps the current target when it is still in the ring, otherwise
    /// falls back to the context default, then to the first entry.
    pub fn set_focus_ring(&mut self, ring: Vec<FocusTarget>) {
        self.ring = ring;
        if self.ring.contains(&self.current) {
            return;
        }
        self.current = self
            .context
            .default_target()
            .filter(|t| self.ring.contains(t))
            .or_else(|| self.ring.first().copied())
            .unwrap_or_default();
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Move focus to `target`. Returns `true` if focus changed.
    pub fn focus(&mut self, target: FocusTarget) -> bool {
        if self.current == target {
            return false;
        }
        self.current = target;
        true
    }

    /// Tab. Wraps at the end of the ring.
    pub fn focus_next(&mut self) -> bool {
        let len = self.ring.len();
        if len == 0 {
            return false;
        }
        let idx = self.position().unwrap_or(len - 1);
        let target = self.ring[(idx + 1) % len];
        self.focus(target)
    }

    /// BackTab. Wraps at the start of the ring.
    pub fn focus_prev(&mut self) -> bool {
        let len = self.ring.len();
        if len == 0 {
            return false;
        }
        let idx = self.position().unwrap_or(0);
        let target = self.ring[(idx + len - 1) % len];
        self.focus(target)
    }

    /// Handle `Tab` (`shift == false`) or `BackTab` (`shift == true`).
    pub fn handle_tab(&mut self, shift: bool) -> bool {
        if shift {
            self.focus_prev()
        } else {
            self.focus_next()
        }
    }

    fn position(&self) -> Option<usize> {
        self.ring.iter().position(|&t| t == self.current)
    }

    // ── Context management ───────────────────────────────────────────

    /// Enter an overlay context with its own ring, saving the current state.
    pub fn push_context(&mut self, context: FocusContext, ring: Vec<FocusTarget>) {
        self.snapshot_stack.push(FocusSnapshot {
            context: self.context,
            target: self.current,
            ring: std::mem::take(&mut self.ring),
        });
        self.context = context;
        self.current = FocusTarget::None;
        self.set_focus_ring(ring);
    }

    /// Leave the active overlay, restoring what was focused before it.
    ///
    /// With nothing to restore this resets to the list screen.
    pub fn pop_context(&mut self) {
        match self.snapshot_stack.pop() {
            Some(snapshot) => {
                self.context = snapshot.context;
                self.current = snapshot.target;
                self.ring = snapshot.ring;
            }
            None => *self = Self::new(),
        }
    }

    /// Pop every overlay of `context` kind and anything stacked above it.
    pub fn pop_to_below(&mut self, context: FocusContext) {
        let stacked = self.context == context
            || self.snapshot_stack.iter().any(|s| s.context == context);
        if !stacked {
            return;
        }
        loop {
            let leaving = self.context;
            self.pop_context();
            if leaving == context {
                break;
            }
        }
    }
}

// ──────────────────────────────────────────────────────────────────────
// Ring builder
// ──────────────────────────────────────────────────────────────────────

/// Builds focus rings in visual order, skipping disabled controls.
#[derive(Debug, Default)]
pub struct FocusRingBuilder {
    targets: Vec<FocusTarget>,
}

impl FocusRingBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `target` if `enabled`.
    #[must_use]
    pub fn control(mut self, target: FocusTarget, enabled: bool) -> Self {
        if enabled {
            self.targets.push(target);
        }
        self
    }

    /// Action controls offered for an item in `status`.
    #[must_use]
    pub fn actions_for(self, status: Status) -> Self {
        match status {
            Status::Pending => self
                .control(FocusTarget::Approve, true)
                .control(FocusTarget::Reject, true),
            Status::Approved | Status::Rejected => self.control(FocusTarget::SetPending, true),
        }
    }

    #[must_use]
    pub fn build(self) -> Vec<FocusTarget> {
        self.targets
    }
}

/// Ring of the detail view for the item at `index` of a `len`-item slice.
#[must_use]
pub fn detail_ring(index: usize, len: usize, status: Status) -> Vec<FocusTarget> {
    FocusRingBuilder::new()
        .control(FocusTarget::PrevButton, index > 0)
        .control(FocusTarget::NextButton, index + 1 < len)
        .control(FocusTarget::CloseIcon, true)
        .actions_for(status)
        .control(FocusTarget::CloseButton, true)
        .build()
}

/// Ring of the reject confirmation.
#[must_use]
pub fn confirm_ring() -> Vec<FocusTarget> {
    vec![FocusTarget::ConfirmYes, FocusTarget::ConfirmNo]
}

// ──────────────────────────────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────────────────────────────
