//! Floor snapshot - reconciled view of tables and their orders
//!
//! A snapshot is built in one pass from the raw table and order lists and is
//! never modified afterwards; every reconciliation publishes a new one with a
//! higher `generation`.

use crate::menu::MenuCatalog;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{DiningTable, Order};
use std::collections::HashMap;

/// An order with its item ids resolved against the menu
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    pub order: Order,
    /// Item names in order; unknown ids are shown as the raw id
    pub item_names: Vec<String>,
}

impl OrderView {
    fn resolve(order: Order, menu: &MenuCatalog) -> Self {
        let item_names = order
            .item_ids
            .iter()
            .map(|id| menu.display_name(id))
            .collect();
        Self { order, item_names }
    }
}

/// One table as the presentation layer should show it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub table: DiningTable,
    pub occupied: bool,
    /// Always empty for a free table
    pub orders: Vec<OrderView>,
}

/// Reconciled state of the whole floor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloorSnapshot {
    /// 0 for the placeholder before the first reconciliation
    pub generation: u64,
    pub taken_at: DateTime<Utc>,
    pub tables: Vec<TableSnapshot>,
}

impl FloorSnapshot {
    /// Placeholder published before the first successful reconciliation
    pub fn empty() -> Self {
        Self {
            generation: 0,
            taken_at: Utc::now(),
            tables: Vec::new(),
        }
    }

    /// Join tables and orders into a new snapshot
    ///
    /// Orders are grouped by table id in a single pass; a free table gets no
    /// orders even if the backend still returns some for it.
    pub fn build(
        generation: u64,
        tables: Vec<DiningTable>,
        orders: Vec<Order>,
        menu: &MenuCatalog,
    ) -> Self {
        let mut by_table: HashMap<String, Vec<Order>> = HashMap::new();
        for order in orders {
            by_table.entry(order.table_id.clone()).or_default().push(order);
        }

        let tables = tables
            .into_iter()
            .map(|table| {
                let occupied = table.is_occupied();
                let orders = if occupied {
                    by_table
                        .remove(&table.id)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|order| OrderView::resolve(order, menu))
                        .collect()
                } else {
                    Vec::new()
                };
                TableSnapshot {
                    table,
                    occupied,
                    orders,
                }
            })
            .collect();

        Self {
            generation,
            taken_at: Utc::now(),
            tables,
        }
    }

    /// Same tables and orders with item names resolved against another menu
    pub fn relabel(&self, generation: u64, menu: &MenuCatalog) -> Self {
        let tables = self
            .tables
            .iter()
            .map(|snap| TableSnapshot {
                table: snap.table.clone(),
                occupied: snap.occupied,
                orders: snap
                    .orders
                    .iter()
                    .map(|view| OrderView::resolve(view.order.clone(), menu))
                    .collect(),
            })
            .collect();

        Self {
            generation,
            taken_at: self.taken_at,
            tables,
        }
    }

    pub fn table(&self, id: &str) -> Option<&TableSnapshot> {
        self.tables.iter().find(|t| t.table.id == id)
    }

    pub fn occupied_count(&self) -> usize {
        self.tables.iter().filter(|t| t.occupied).count()
    }
}
