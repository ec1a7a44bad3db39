//! Operator selection set.

use indexmap::IndexSet;
use modq_core::ItemId;

/// Ids checked by the operator, in the order they were checked.
///
/// The engine keeps this a subset of the active filter: anything that
/// leaves the filtered view is pruned through [`Selection::retain`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: IndexSet<ItemId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the id was not already selected.
    pub fn insert(&mut self, id: ItemId) -> bool {
        self.ids.insert(id)
    }

    /// Returns `true` if the id was selected.
    pub fn remove(&mut self, id: ItemId) -> bool {
        self.ids.shift_remove(&id)
    }

    /// Flip membership; returns whether the id is selected afterwards.
    pub fn toggle(&mut self, id: ItemId) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns `true` if anything was selected.
    pub fn clear(&mut self) -> bool {
        let had_any = !self.ids.is_empty();
        self.ids.clear();
        had_any
    }

    /// Keep only ids matching `keep`; returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(ItemId) -> bool) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| keep(*id));
        before - self.ids.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.ids.iter().copied()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<ItemId> {
        self.iter().collect()
    }
}
