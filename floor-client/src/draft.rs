//! OrderDraftManager - 点单草稿
//!
//! Holds the items picked for one table before the order is submitted.
//! Items are unique by id and kept in the order they were picked.

use shared::{ItemId, MenuItem, TableId};

/// Items picked for one table
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub table_id: TableId,
    pub items: Vec<MenuItem>,
}

impl OrderDraft {
    fn new(table_id: TableId) -> Self {
        Self {
            table_id,
            items: Vec::new(),
        }
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.items.iter().any(|item| item.id == item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|item| item.price).sum()
    }
}

#[derive(Debug, Default)]
pub struct OrderDraftManager {
    draft: Option<OrderDraft>,
}

impl OrderDraftManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start composing for `table_id`
    ///
    /// A draft kept for the same table is restored; any other draft is dropped.
    pub fn open(&mut self, table_id: &str) -> &OrderDraft {
        if self.table_id() != Some(table_id) {
            self.draft = None;
        }
        self.draft
            .get_or_insert_with(|| OrderDraft::new(table_id.to_string()))
    }

    /// Add an item; returns `false` if it was already present or no draft is open
    pub fn add(&mut self, item: MenuItem) -> bool {
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        if draft.contains(&item.id) {
            return false;
        }
        draft.items.push(item);
        true
    }

    pub fn remove(&mut self, item_id: &str) -> bool {
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        let before = draft.items.len();
        draft.items.retain(|item| item.id != item_id);
        draft.items.len() != before
    }

    pub fn reset(&mut self) {
        self.draft = None;
    }

    /// Item ids in the order they were added
    pub fn to_id_list(&self) -> Vec<ItemId> {
        self.draft
            .as_ref()
            .map(|draft| draft.items.iter().map(|item| item.id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn current(&self) -> Option<&OrderDraft> {
        self.draft.as_ref()
    }

    pub fn table_id(&self) -> Option<&str> {
        self.draft.as_ref().map(|draft| draft.table_id.as_str())
    }
}
