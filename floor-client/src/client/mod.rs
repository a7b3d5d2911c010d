//! Client module - typed access to the floor backend.
//!
//! [`FloorBackend`] is the seam every engine component is generic over;
//! [`RemoteStateClient`] is the network implementation.

mod remote;

pub use remote::RemoteStateClient;

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use shared::{DiningTable, FreeTable, ItemId, MenuItem, Order};
use std::fmt;

/// Backend operation, used for log fields and fallback messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListMenu,
    ListTables,
    ListOrders,
    Occupy,
    Vacate,
    CreateOrder,
    GetOrder,
    MarkOrderReady,
    ListFreeTables,
}

impl Operation {
    /// Message shown when the backend gives no `detail`
    pub fn fallback_message(self) -> &'static str {
        match self {
            Operation::ListMenu => "Failed to fetch menu items",
            Operation::ListTables => "Failed to fetch tables",
            Operation::ListOrders => "Failed to fetch orders",
            Operation::Occupy => "Failed to occupy table",
            Operation::Vacate => "Failed to vacate table",
            Operation::CreateOrder => "Failed to create order.",
            Operation::GetOrder => "Failed to fetch order",
            Operation::MarkOrderReady => "Failed to mark order as ready",
            Operation::ListFreeTables => "Failed to fetch free tables",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ListMenu => "list_menu",
            Operation::ListTables => "list_tables",
            Operation::ListOrders => "list_orders",
            Operation::Occupy => "occupy",
            Operation::Vacate => "vacate",
            Operation::CreateOrder => "create_order",
            Operation::GetOrder => "get_order",
            Operation::MarkOrderReady => "mark_order_ready",
            Operation::ListFreeTables => "list_free_tables",
        };
        f.write_str(name)
    }
}

/// Floor backend operations
///
/// One call is one request: no retries, no caching.
#[async_trait]
pub trait FloorBackend: Send + Sync {
    async fn list_menu(&self) -> ClientResult<Vec<MenuItem>>;
    async fn list_tables(&self) -> ClientResult<Vec<DiningTable>>;
    /// An empty order book is `Ok(vec![])`, never an error
    async fn list_orders(&self) -> ClientResult<Vec<Order>>;
    /// Success is the status alone; the response body is ignored
    async fn occupy(&self, table_id: &str) -> ClientResult<()>;
    async fn vacate(&self, table_id: &str) -> ClientResult<()>;
    /// Implementations must call [`validate_order_request`] before touching the network
    async fn create_order(&self, table_id: &str, item_ids: &[ItemId]) -> ClientResult<Order>;
    async fn get_order(&self, order_id: &str) -> ClientResult<Order>;
    async fn mark_order_ready(&self, order_id: &str) -> ClientResult<Order>;
    async fn list_free_tables(&self) -> ClientResult<Vec<FreeTable>>;
}

/// Local checks for a new order
pub fn validate_order_request(table_id: &str, item_ids: &[ItemId]) -> ClientResult<()> {
    if table_id.trim().is_empty() {
        return Err(ClientError::validation("Table ID is missing."));
    }
    if item_ids.is_empty() {
        return Err(ClientError::validation("Please select at least one item."));
    }
    if item_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(ClientError::validation("Items must be a list of menu item ids."));
    }
    Ok(())
}
