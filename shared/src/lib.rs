//! Shared types for the floor client
//!
//! Wire models exchanged with the floor-management backend: menu items,
//! dining tables, orders, request payloads and the backend's error body.

pub mod models;
pub mod request;
pub mod response;
pub mod serde_helpers;
pub mod types;

// Re-exports
pub use models::{DiningTable, FreeTable, MenuItem, Order};
pub use request::{OccupyTableRequest, OrderCreate};
pub use response::ApiErrorBody;
pub use serde::{Deserialize, Serialize};
pub use types::{ItemId, OrderId, TableId};
