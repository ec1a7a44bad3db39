//! Change notifications for presentation collaborators.
//!
//! Subscribers register for the state slices they read. The engine marks
//! topics dirty while it mutates and flushes once per public operation, so
//! a subscriber sees each topic at most once per operation.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Item statuses or the visible slice.
    Items,
    Selection,
    Focus,
    Detail,
    Notification,
    /// Active filter or loaded count.
    Window,
    /// Batch or grow busy flags.
    Busy,
    Confirm,
}

impl Topic {
    pub const ALL: [Self; 8] = [
        Self::Items,
        Self::Selection,
        Self::Focus,
        Self::Detail,
        Self::Notification,
        Self::Window,
        Self::Busy,
        Self::Confirm,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type ChangeCallback = Box<dyn FnMut(&[Topic])>;

struct Subscriber {
    id: SubscriptionId,
    topics: BTreeSet<Topic>,
    callback: ChangeCallback,
}

#[derive(Default)]
pub struct ChangeBus {
    subscribers: Vec<Subscriber>,
    dirty: BTreeSet<Topic>,
    next_id: u64,
}

impl fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBus")
            .field("subscribers", &self.subscribers.len())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl ChangeBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        topics: impl IntoIterator<Item = Topic>,
        callback: ChangeCallback,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber {
            id,
            topics: topics.into_iter().collect(),
            callback,
        });
        id
    }

    /// Returns `false` for an unknown id.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn mark(&mut self, topic: Topic) {
        self.dirty.insert(topic);
    }

    #[must_use]
    pub fn is_dirty(&self, topic: Topic) -> bool {
        self.dirty.contains(&topic)
    }

    /// Deliver the dirty topics to every interested subscriber, then reset.
    pub fn flush(&mut self) {
        if self.dirty.is_empty() {
            return;
        }
        let dirty = std::mem::take(&mut self.dirty);
        for sub in &mut self.subscribers {
            let hits: Vec<Topic> = sub.topics.intersection(&dirty).copied().collect();
            if !hits.is_empty() {
                (sub.callback)(&hits);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<Vec<Topic>>>>, ChangeCallback) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, Box::new(move |t: &[Topic]| sink.borrow_mut().push(t.to_vec())))
    }

    #[test]
    fn delivers_only_subscribed_topics_once_per_flush() {
        let mut bus = ChangeBus::new();
        let (log, cb) = recorder();
        bus.subscribe([Topic::Items, Topic::Selection], cb);

        bus.mark(Topic::Items);
        bus.mark(Topic::Items);
        bus.mark(Topic::Focus);
        bus.flush();
        bus.flush();
        assert_eq!(*log.borrow(), vec![vec![Topic::Items]]);

        bus.mark(Topic::Focus);
        bus.flush();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = ChangeBus::new();
        let (log, cb) = recorder();
        let id = bus.subscribe(Topic::ALL, cb);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.mark(Topic::Busy);
        bus.flush();
        assert!(log.borrow().is_empty());
        assert!(!bus.is_dirty(Topic::Busy));
    }
}
