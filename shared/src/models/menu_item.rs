//! Menu Item Model

use crate::serde_helpers;
use crate::types::ItemId;
use serde::{Deserialize, Serialize};

/// Menu item entity, immutable once loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(rename = "item_id", with = "serde_helpers::id")]
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
}

impl MenuItem {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            price,
        }
    }
}
