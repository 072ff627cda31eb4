//! Keyed-list reducer for remote change feeds
//!
//! Keeps a fetched snapshot consistent with a live subscription by applying
//! tagged diffs. Insert must deduplicate by key: a locally issued mutation's
//! realtime echo can arrive before or after the mutation's own response, so
//! the same row may be offered twice.

use uuid::Uuid;

/// Rows that can be addressed by id.
pub trait Keyed {
    fn key(&self) -> Uuid;
}

/// Where live inserts land relative to the existing items. Must match the
/// initial fetch's sort order or the list visibly jumps: conversations are
/// fetched newest-first (prepend), messages oldest-first (append).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOrder {
    Append,
    Prepend,
}

/// An in-memory list synchronized against a remote table.
#[derive(Debug, Clone)]
pub struct SyncedList<T> {
    items: Vec<T>,
    order: InsertOrder,
}

impl<T: Keyed> SyncedList<T> {
    pub fn new(order: InsertOrder) -> Self {
        Self {
            items: Vec::new(),
            order,
        }
    }

    /// Replace the whole list from an initial fetch.
    pub fn reset(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Apply an insert diff; a no-op when the key is already present.
    pub fn apply_insert(&mut self, item: T) {
        if self.items.iter().any(|existing| existing.key() == item.key()) {
            return;
        }
        match self.order {
            InsertOrder::Append => self.items.push(item),
            InsertOrder::Prepend => self.items.insert(0, item),
        }
    }

    /// Apply an update diff: wholesale replacement of the matching entry,
    /// position preserved. Unknown keys are ignored.
    pub fn apply_update(&mut self, item: T) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|existing| existing.key() == item.key())
        {
            *existing = item;
        }
    }

    /// Apply a delete diff. Unknown keys are ignored.
    pub fn apply_delete(&mut self, key: Uuid) {
        self.items.retain(|existing| existing.key() != key);
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: Uuid,
        body: String,
    }

    impl Keyed for Row {
        fn key(&self) -> Uuid {
            self.id
        }
    }

    fn row(id: Uuid, body: &str) -> Row {
        Row {
            id,
            body: body.into(),
        }
    }

    #[test]
    fn insert_dedups_by_id() {
        let mut list = SyncedList::new(InsertOrder::Append);
        let id = Uuid::new_v4();
        list.apply_insert(row(id, "first"));
        list.apply_insert(row(id, "echo"));
        assert_eq!(list.len(), 1);
        assert_eq!(list.items()[0].body, "first");
    }

    #[test]
    fn prepend_puts_live_inserts_first() {
        let mut list = SyncedList::new(InsertOrder::Prepend);
        list.apply_insert(row(Uuid::new_v4(), "older"));
        list.apply_insert(row(Uuid::new_v4(), "newer"));
        assert_eq!(list.items()[0].body, "newer");
    }

    #[test]
    fn append_keeps_arrival_order() {
        let mut list = SyncedList::new(InsertOrder::Append);
        list.apply_insert(row(Uuid::new_v4(), "first"));
        list.apply_insert(row(Uuid::new_v4(), "second"));
        assert_eq!(list.items()[1].body, "second");
    }

    #[test]
    fn update_replaces_in_place() {
        let mut list = SyncedList::new(InsertOrder::Append);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        list.reset(vec![row(a, "a"), row(b, "b")]);

        list.apply_update(row(a, "a2"));
        assert_eq!(list.items()[0].body, "a2");
        assert_eq!(list.items()[1].body, "b");
    }

    #[test]
    fn update_of_unknown_key_is_noop() {
        let mut list = SyncedList::new(InsertOrder::Append);
        list.apply_insert(row(Uuid::new_v4(), "only"));
        list.apply_update(row(Uuid::new_v4(), "ghost"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn delete_removes_matching_entry() {
        let mut list = SyncedList::new(InsertOrder::Append);
        let id = Uuid::new_v4();
        list.apply_insert(row(id, "gone"));
        list.apply_delete(id);
        assert!(list.is_empty());
        // Deleting again is harmless.
        list.apply_delete(id);
        assert!(list.is_empty());
    }
}
