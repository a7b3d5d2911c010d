//! Menu catalog
//!
//! The loaded menu is replaced wholesale on every fetch; there is no
//! incremental diffing. Lookups by id back the order-line name join and the
//! suggestion filter.

use shared::MenuItem;
use std::collections::HashMap;

/// Immutable set of menu items indexed by id
#[derive(Debug, Clone, Default)]
pub struct MenuCatalog {
    items: Vec<MenuItem>,
    by_id: HashMap<String, usize>,
}

impl MenuCatalog {
    /// Build a catalog; when ids repeat, the first item wins the lookup
    pub fn new(items: Vec<MenuItem>) -> Self {
        let mut by_id = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            by_id.entry(item.id.clone()).or_insert(idx);
        }
        Self { items, by_id }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MenuItem> {
        self.by_id.get(id).map(|&idx| &self.items[idx])
    }

    /// Item name, or the raw id when the item is unknown
    pub fn display_name(&self, id: &str) -> String {
        match self.get(id) {
            Some(item) => item.name.clone(),
            None => id.to_string(),
        }
    }

    /// Items whose name contains `needle` (already lowercased), in menu order
    pub fn matching(&self, needle: &str) -> Vec<MenuItem> {
        self.items
            .iter()
            .filter(|item| item.name.to_lowercase().contains(needle))
            .cloned()
            .collect()
    }
}
