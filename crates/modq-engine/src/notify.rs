//! Transient notification channel.
//!
//! Exactly one notification is observable at a time. Publishing replaces
//! the current one and re-arms the auto-close timer.

use std::time::Duration;

use modq_core::Variant;
use serde::Serialize;

use crate::clock::{Scheduler, TaskId, Timer};
use crate::undo::UndoHandle;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub open: bool,
    pub message: String,
    pub variant: Variant,
    /// Undo bound to this notification, if the operation left one live.
    pub undo: Option<UndoHandle>,
}

#[derive(Debug, Default)]
pub struct NotificationChannel {
    current: Notification,
    generation: u64,
    close_task: Option<TaskId>,
}

impl NotificationChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn current(&self) -> &Notification {
        &self.current
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.current.open
    }

    /// Replace whatever is showing and schedule auto-close after `duration`.
    pub fn notify(
        &mut self,
        message: impl Into<String>,
        variant: Variant,
        undo: Option<UndoHandle>,
        duration: Duration,
        scheduler: &mut Scheduler<Timer>,
    ) {
        self.cancel_timer(scheduler);
        self.generation += 1;
        self.current = Notification {
            open: true,
            message: message.into(),
            variant,
            undo,
        };
        self.close_task = Some(scheduler.schedule(
            duration,
            Timer::NotificationClose {
                generation: self.generation,
            },
        ));
        tracing::debug!(
            message = %self.current.message,
            variant = ?variant,
            "notification published"
        );
    }

    /// Close the current notification. Returns `false` if nothing was open.
    pub fn close(&mut self, scheduler: &mut Scheduler<Timer>) -> bool {
        self.cancel_timer(scheduler);
        self.reset()
    }

    /// Timer callback; ignores generations that were superseded.
    pub fn auto_close(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.close_task = None;
        self.reset()
    }

    fn reset(&mut self) -> bool {
        let was_open = self.current.open;
        self.current = Notification::default();
        was_open
    }

    fn cancel_timer(&mut self, scheduler: &mut Scheduler<Timer>) {
        if let Some(task) = self.close_task.take() {
            scheduler.cancel(task);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW: Duration = Duration::from_millis(3000);

    fn pump(ch: &mut NotificationChannel, sched: &mut Scheduler<Timer>, by: Duration) {
        for timer in sched.advance(by) {
            if let Timer::NotificationClose { generation } = timer {
                ch.auto_close(generation);
            }
        }
    }

    #[test]
    fn auto_closes_after_duration() {
        let mut ch = NotificationChannel::new();
        let mut sched = Scheduler::new();
        ch.notify("Item approved", Variant::Success, None, SHOW, &mut sched);
        assert!(ch.is_open());
        assert_eq!(ch.current().variant, Variant::Success);
        pump(&mut ch, &mut sched, SHOW - Duration::from_millis(1));
        assert!(ch.is_open());
        pump(&mut ch, &mut sched, Duration::from_millis(1));
        assert!(!ch.is_open());
        assert_eq!(ch.current(), &Notification::default());
    }

    #[test]
    fn replacement_restarts_the_timer() {
        let mut ch = NotificationChannel::new();
        let mut sched = Scheduler::new();
        ch.notify("first", Variant::Info, None, SHOW, &mut sched);
        pump(&mut ch, &mut sched, Duration::from_millis(2000));
        ch.notify("second", Variant::Error, None, SHOW, &mut sched);
        assert_eq!(sched.len(), 1);
        pump(&mut ch, &mut sched, Duration::from_millis(1500));
        assert!(ch.is_open());
        assert_eq!(ch.current().message, "second");
        pump(&mut ch, &mut sched, Duration::from_millis(1500));
        assert!(!ch.is_open());
    }

    #[test]
    fn explicit_close_cancels_timer() {
        let mut ch = NotificationChannel::new();
        let mut sched = Scheduler::new();
        ch.notify("x", Variant::Info, None, SHOW, &mut sched);
        assert!(ch.close(&mut sched));
        assert!(sched.is_empty());
        assert!(!ch.close(&mut sched));
    }
}
