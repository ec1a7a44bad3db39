//! Item store and status transition machine.
//!
//! The store owns the canonical item list in report order. The only
//! mutation it offers is [`ItemStore::transition`], which overwrites an
//! item's status unconditionally. The pending/approved/rejected adjacency
//! rule is enforced by callers through [`Status::can_transition_to`].

use std::collections::HashMap;

use modq_core::{Error, Item, ItemId, Result, Status, StatusCounts};

/// Owned, in-memory collection of reported items.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Vec<Item>,
    index: HashMap<ItemId, usize>,
}

impl ItemStore {
    /// Build a store from an externally seeded collection.
    ///
    /// Fails on duplicate ids; order is preserved as given.
    pub fn new(items: Vec<Item>) -> Result<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            if index.insert(item.id, pos).is_some() {
                return Err(Error::DuplicateItemId(item.id));
            }
        }
        Ok(Self { items, index })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.index.get(&id).map(|&pos| &self.items[pos])
    }

    #[must_use]
    pub fn status(&self, id: ItemId) -> Option<Status> {
        self.get(id).map(|item| item.status)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Items with `status`, in report order.
    pub fn filtered(&self, status: Status) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |item| item.status == status)
    }

    #[must_use]
    pub fn filtered_ids(&self, status: Status) -> Vec<ItemId> {
        self.filtered(status).map(|item| item.id).collect()
    }

    #[must_use]
    pub fn count(&self, status: Status) -> usize {
        self.filtered(status).count()
    }

    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for item in &self.items {
            counts.bump(item.status);
        }
        counts
    }

    /// Set the status of `id` to `target`.
    ///
    /// Returns the prior status, or `None` when the id is unknown (the
    /// call is then a silent no-op).
    pub fn transition(&mut self, id: ItemId, target: Status) -> Option<Status> {
        let Some(&pos) = self.index.get(&id) else {
            tracing::debug!(%id, %target, "transition on unknown item ignored");
            return None;
        };
        let item = &mut self.items[pos];
        let prior = item.status;
        item.status = target;
        tracing::debug!(%id, %prior, %target, "item transitioned");
        Some(prior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ItemStore {
        ItemStore::new(vec![
            Item::new(1, "one"),
            Item::new(2, "two").with_status(Status::Approved),
            Item::new(3, "three"),
            Item::new(4, "four").with_status(Status::Rejected),
        ])
        .unwrap()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = ItemStore::new(vec![Item::new(9, "a"), Item::new(9, "b")]).unwrap_err();
        assert!(matches!(err, Error::DuplicateItemId(ItemId(9))));
    }

    #[test]
    fn filtered_preserves_report_order() {
        let s = store();
        assert_eq!(s.filtered_ids(Status::Pending), vec![ItemId(1), ItemId(3)]);
        assert_eq!(s.filtered_ids(Status::Approved), vec![ItemId(2)]);
        assert_eq!(s.count(Status::Rejected), 1);
    }

    #[test]
    fn transition_overwrites_unconditionally() {
        let mut s = store();
        // approved -> rejected is not an operator move, but the store allows it.
        assert_eq!(s.transition(ItemId(2), Status::Rejected), Some(Status::Approved));
        assert_eq!(s.status(ItemId(2)), Some(Status::Rejected));
        // Same-status writes are fine too.
        assert_eq!(s.transition(ItemId(2), Status::Rejected), Some(Status::Rejected));
    }

    #[test]
    fn transition_on_missing_item_is_silent() {
        let mut s = store();
        let before = s.counts();
        assert_eq!(s.transition(ItemId(404), Status::Approved), None);
        assert_eq!(s.counts(), before);
    }

    #[test]
    fn last_write_wins() {
        let mut s = store();
        s.transition(ItemId(1), Status::Approved);
        s.transition(ItemId(1), Status::Pending);
        s.transition(ItemId(1), Status::Rejected);
        assert_eq!(s.status(ItemId(1)), Some(Status::Rejected));
    }

    #[test]
    fn counts_cover_every_item() {
        let s = store();
        let counts = s.counts();
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.approved, 1);
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.total(), s.len());
    }
}
