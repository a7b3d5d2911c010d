//! Menu search
//!
//! Case-insensitive substring match over item names. The query is trimmed
//! first; an empty query matches nothing.

mod debounce;

pub use debounce::{Debounced, DebouncedSearch, debounce};

use crate::menu::MenuCatalog;
use shared::MenuItem;
use std::sync::Arc;
use std::time::Duration;

/// Suggestion list for one evaluated query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestions {
    /// Normalized query the list was computed for
    pub query: String,
    pub items: Vec<MenuItem>,
}

impl Suggestions {
    /// Whether the suggestion list should be shown
    pub fn is_visible(&self) -> bool {
        !self.items.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SearchIndex {
    catalog: Arc<MenuCatalog>,
}

impl SearchIndex {
    pub fn new(catalog: Arc<MenuCatalog>) -> Self {
        Self { catalog }
    }

    /// Matching items in menu order
    pub fn query(&self, text: &str) -> Vec<MenuItem> {
        let needle = normalize_query(text);
        if needle.is_empty() {
            return Vec::new();
        }
        self.catalog.matching(&needle)
    }

    pub fn suggest(&self, text: &str) -> Suggestions {
        Suggestions {
            query: normalize_query(text),
            items: self.query(text),
        }
    }

    /// Suggestions for a timestamped keystroke sequence, one per burst
    pub fn results_for<I, S>(&self, inputs: I, window: Duration) -> impl Iterator<Item = Suggestions>
    where
        I: IntoIterator<Item = (Duration, S)>,
        S: AsRef<str>,
    {
        debounce(inputs, window).map(|text| self.suggest(text.as_ref()))
    }
}

pub fn normalize_query(text: &str) -> String {
    text.trim().to_lowercase()
}
