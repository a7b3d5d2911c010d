//! Dining Table Model

use crate::serde_helpers;
use crate::types::{TableId, Timestamp};
use serde::{Deserialize, Serialize};

/// Dining table entity (桌台)
///
/// Occupancy is never stored; it is derived from the two timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningTable {
    #[serde(rename = "table_id", with = "serde_helpers::id")]
    pub id: TableId,
    /// When guests were seated
    #[serde(rename = "occupied_time", default, with = "serde_helpers::option_timestamp")]
    pub occupied_at: Option<Timestamp>,
    /// When guests left
    #[serde(rename = "departure_time", default, with = "serde_helpers::option_timestamp")]
    pub departed_at: Option<Timestamp>,
}

impl DiningTable {
    /// A table that has never been occupied
    pub fn free(id: impl Into<TableId>) -> Self {
        Self {
            id: id.into(),
            occupied_at: None,
            departed_at: None,
        }
    }

    /// Occupied iff seated and not yet departed
    pub fn is_occupied(&self) -> bool {
        self.occupied_at.is_some() && self.departed_at.is_none()
    }
}

/// Entry of `GET /free-tables`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTable {
    #[serde(with = "serde_helpers::id")]
    pub table_id: TableId,
}
