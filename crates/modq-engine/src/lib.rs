//! Interaction engine for the modq moderation queue
//!
//! This crate holds every piece of state a moderation screen reads and the
//! operations that change it:
//! - `ItemStore`: authoritative item statuses
//! - `Selection`, `PaginationWindow`: what the operator sees and has picked
//! - `BatchCoordinator`, `UndoBuffer`, `NotificationChannel`: bulk actions,
//!   their single-level undo and the transient message that offers it
//! - `Navigator`, `FocusManager`, `keymap`: keyboard focus and bindings
//! - `QueueEngine`: the facade wiring them to a virtual clock
//!
//! Latency is modeled by a deterministic scheduler; nothing here spawns
//! threads or touches wall-clock time.

#![forbid(unsafe_code)]

pub mod batch;
pub mod bus;
pub mod clock;
pub mod engine;
pub mod focus;
pub mod keymap;
pub mod navigator;
pub mod notify;
pub mod pagination;
pub mod selection;
pub mod store;
pub mod undo;

pub use batch::{BatchOutcome, BatchTicket, ModerationBackend, SimulatedBackend};
pub use bus::{SubscriptionId, Topic};
pub use clock::{Scheduler, Timer};
pub use engine::{Dispatch, EngineSnapshot, ItemState, QueueEngine, UNDO_MESSAGE};
pub use focus::{FocusContext, FocusTarget};
pub use keymap::{Command, KeyCode, KeyEvent, KeyScope, Modifiers};
pub use notify::Notification;
pub use undo::{UndoHandle, UndoSnapshot};
