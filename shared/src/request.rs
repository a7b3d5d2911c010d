//! Request types for the shared crate
//!
//! Bodies of the mutating backend endpoints.

use crate::types::{ItemId, TableId};
use serde::{Serialize, Serializer};

/// Body of `POST /tables/occupy`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupyTableRequest {
    pub table_id: TableId,
}

/// Body of `POST /orders`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCreate {
    /// Sent as a JSON number when numeric; the orders endpoint declares it as an integer
    #[serde(serialize_with = "serialize_table_ref")]
    pub table_id: TableId,
    pub items: Vec<ItemId>,
}

fn serialize_table_ref<S>(table_id: &str, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match table_id.trim().parse::<i64>() {
        Ok(n) => s.serialize_i64(n),
        Err(_) => s.serialize_str(table_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_create_numeric_table_id() {
        let body = OrderCreate {
            table_id: "3".to_string(),
            items: vec!["9".to_string()],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, serde_json::json!({"table_id": 3, "items": ["9"]}));
    }

    #[test]
    fn test_order_create_textual_table_id() {
        let body = OrderCreate {
            table_id: "patio-2".to_string(),
            items: vec![],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["table_id"], "patio-2");
    }

    #[test]
    fn test_occupy_sends_string_id() {
        let value = serde_json::to_value(OccupyTableRequest {
            table_id: "3".to_string(),
        })
        .unwrap();
        assert_eq!(value, serde_json::json!({"table_id": "3"}));
    }
}
