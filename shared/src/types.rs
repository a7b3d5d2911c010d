//! Common types for the shared crate
//!
//! The backend keys every entity by an opaque string id.

/// Dining table id (`table_id` on the wire)
pub type TableId = String;

/// Menu item id (`item_id` on the wire)
pub type ItemId = String;

/// Order id (`order_id` on the wire)
pub type OrderId = String;

/// Timestamp type used by every model
pub type Timestamp = chrono::DateTime<chrono::Utc>;
