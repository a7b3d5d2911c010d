//! Order Model

use crate::serde_helpers;
use crate::types::{ItemId, OrderId, TableId, Timestamp};
use serde::{Deserialize, Serialize};

/// Order entity, owned by the backend and read-only on the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "order_id", with = "serde_helpers::id")]
    pub id: OrderId,
    #[serde(with = "serde_helpers::id")]
    pub table_id: TableId,
    /// Menu item ids in the order they were picked
    #[serde(rename = "items", default, with = "serde_helpers::vec_id")]
    pub item_ids: Vec<ItemId>,
    #[serde(rename = "order_time", default, with = "serde_helpers::option_timestamp")]
    pub created_at: Option<Timestamp>,
    #[serde(rename = "ready_time", default, with = "serde_helpers::option_timestamp")]
    pub ready_at: Option<Timestamp>,
    /// Preparation duration as rendered by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation_time: Option<String>,
}

impl Order {
    pub fn new(id: impl Into<OrderId>, table_id: impl Into<TableId>, item_ids: Vec<ItemId>) -> Self {
        Self {
            id: id.into(),
            table_id: table_id.into(),
            item_ids,
            created_at: None,
            ready_at: None,
            preparation_time: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_order() {
        let json = r#"{
            "order_id": "0b6f6a4e-5c1f-4a55-9d0e-3f1c5f0d2a11",
            "table_id": "2",
            "order_time": "2025-03-01T18:10:00",
            "ready_time": null,
            "preparation_time": null,
            "items": ["9", "12"]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.table_id, "2");
        assert_eq!(order.item_ids, vec!["9".to_string(), "12".to_string()]);
        assert!(order.created_at.is_some());
        assert!(!order.is_ready());
    }

    #[test]
    fn test_deserialize_numeric_item_ids() {
        let order: Order =
            serde_json::from_str(r#"{"order_id": 5, "table_id": 2, "items": [9]}"#).unwrap();
        assert_eq!(order, Order::new("5", "2", vec!["9".to_string()]));
    }
}
