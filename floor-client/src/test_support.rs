//! Test fixtures: recording fake backend and notifier

use crate::client::{FloorBackend, validate_order_request};
use crate::error::{ClientError, ClientResult};
use crate::menu::MenuCatalog;
use crate::notify::{Notice, Notifier};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use shared::{DiningTable, FreeTable, ItemId, MenuItem, Order};
use std::sync::Arc;
use tokio::sync::{Notify, Semaphore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListMenu,
    ListTables,
    ListOrders,
    Occupy(String),
    Vacate(String),
    CreateOrder(String, Vec<ItemId>),
    GetOrder(String),
    MarkOrderReady(String),
    ListFreeTables,
}

/// In-memory backend with scripted responses
///
/// Every call is recorded before it waits on the optional gate, so tests can
/// hold requests "in flight" and assert on what was sent.
pub struct FakeBackend {
    menu: Mutex<ClientResult<Vec<MenuItem>>>,
    tables: Mutex<ClientResult<Vec<DiningTable>>>,
    orders: Mutex<ClientResult<Vec<Order>>>,
    occupy: Mutex<ClientResult<()>>,
    vacate: Mutex<ClientResult<()>>,
    create_order: Mutex<Option<ClientResult<Order>>>,
    calls: Mutex<Vec<Call>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    entered: Notify,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            menu: Mutex::new(Ok(Vec::new())),
            tables: Mutex::new(Ok(Vec::new())),
            orders: Mutex::new(Ok(Vec::new())),
            occupy: Mutex::new(Ok(())),
            vacate: Mutex::new(Ok(())),
            create_order: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
            entered: Notify::new(),
        }
    }

    pub fn set_menu(&self, result: ClientResult<Vec<MenuItem>>) {
        *self.menu.lock() = result;
    }

    pub fn set_tables(&self, result: ClientResult<Vec<DiningTable>>) {
        *self.tables.lock() = result;
    }

    pub fn set_orders(&self, result: ClientResult<Vec<Order>>) {
        *self.orders.lock() = result;
    }

    pub fn set_occupy(&self, result: ClientResult<()>) {
        *self.occupy.lock() = result;
    }

    pub fn set_vacate(&self, result: ClientResult<()>) {
        *self.vacate.lock() = result;
    }

    /// Scripted create_order result; unset echoes a new order with id "1"
    pub fn set_create_order(&self, result: ClientResult<Order>) {
        *self.create_order.lock() = Some(result);
    }

    /// Block every subsequent call until permits are added
    pub fn gate(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    /// Wait until a call has reached the gate
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    async fn enter(&self, call: Call) {
        self.calls.lock().push(call);
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            self.entered.notify_one();
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

#[async_trait]
impl FloorBackend for FakeBackend {
    async fn list_menu(&self) -> ClientResult<Vec<MenuItem>> {
        self.enter(Call::ListMenu).await;
        self.menu.lock().clone()
    }

    async fn list_tables(&self) -> ClientResult<Vec<DiningTable>> {
        self.enter(Call::ListTables).await;
        self.tables.lock().clone()
    }

    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        self.enter(Call::ListOrders).await;
        self.orders.lock().clone()
    }

    async fn occupy(&self, table_id: &str) -> ClientResult<()> {
        self.enter(Call::Occupy(table_id.to_string())).await;
        self.occupy.lock().clone()
    }

    async fn vacate(&self, table_id: &str) -> ClientResult<()> {
        self.enter(Call::Vacate(table_id.to_string())).await;
        self.vacate.lock().clone()
    }

    async fn create_order(&self, table_id: &str, item_ids: &[ItemId]) -> ClientResult<Order> {
        validate_order_request(table_id, item_ids)?;
        self.enter(Call::CreateOrder(table_id.to_string(), item_ids.to_vec()))
            .await;
        let scripted = self.create_order.lock().clone();
        scripted.unwrap_or_else(|| Ok(Order::new("1", table_id, item_ids.to_vec())))
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        self.enter(Call::GetOrder(order_id.to_string())).await;
        Err(ClientError::network(Some(404), "Order not found"))
    }

    async fn mark_order_ready(&self, order_id: &str) -> ClientResult<Order> {
        self.enter(Call::MarkOrderReady(order_id.to_string())).await;
        Err(ClientError::network(Some(404), "Order not found"))
    }

    async fn list_free_tables(&self) -> ClientResult<Vec<FreeTable>> {
        self.enter(Call::ListFreeTables).await;
        Ok(Vec::new())
    }
}

/// Notifier that keeps every notice
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices.lock().iter().map(Notice::message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

pub fn free_table(id: &str) -> DiningTable {
    DiningTable::free(id)
}

pub fn occupied_table(id: &str) -> DiningTable {
    DiningTable {
        occupied_at: Some(Utc::now()),
        ..DiningTable::free(id)
    }
}

pub fn order(id: &str, table_id: &str, items: &[&str]) -> Order {
    Order::new(id, table_id, items.iter().map(|s| s.to_string()).collect())
}

pub fn menu(items: Vec<MenuItem>) -> MenuCatalog {
    MenuCatalog::new(items)
}
