//! TableSynchronizer - 桌台占用状态同步
//!
//! Pulls tables and orders together, joins them into a [`FloorSnapshot`] and
//! publishes it on a watch channel. A failed pull never touches the
//! published snapshot.

use crate::client::FloorBackend;
use crate::error::{ClientError, ClientResult, Resource};
use crate::menu::MenuCatalog;
use crate::notify::{Notice, Notifier};
use crate::snapshot::FloorSnapshot;
use shared::{DiningTable, Order};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Notify, watch};

/// Prefix of the notice shown when a reconciliation fails
pub const RECONCILE_FAILED: &str = "Unable to load tables. Please try again later.";

/// Result of a [`TableSynchronizer::reconcile`] call
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// A new snapshot was published
    Applied(Arc<FloorSnapshot>),
    /// Another reconciliation was already running; nothing was fetched
    Coalesced,
}

impl ReconcileOutcome {
    pub fn snapshot(&self) -> Option<&Arc<FloorSnapshot>> {
        match self {
            ReconcileOutcome::Applied(snapshot) => Some(snapshot),
            ReconcileOutcome::Coalesced => None,
        }
    }
}

/// Re-entrancy guard, released on drop so a cancelled reconcile never wedges it
///
/// Release wakes everything parked on `released`.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
    released: &'a Notify,
}

impl<'a> InFlightGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool, released: &'a Notify) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag, released })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        self.released.notify_waiters();
    }
}

pub struct TableSynchronizer<B: FloorBackend> {
    backend: Arc<B>,
    notifier: Arc<dyn Notifier>,
    menu: watch::Sender<Arc<MenuCatalog>>,
    snapshot: watch::Sender<Arc<FloorSnapshot>>,
    generation: AtomicU64,
    in_flight: AtomicBool,
    released: Notify,
}

impl<B: FloorBackend> TableSynchronizer<B> {
    pub fn new(backend: Arc<B>, notifier: Arc<dyn Notifier>) -> Self {
        let (menu, _) = watch::channel(Arc::new(MenuCatalog::default()));
        let (snapshot, _) = watch::channel(Arc::new(FloorSnapshot::empty()));
        Self {
            backend,
            notifier,
            menu,
            snapshot,
            generation: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
            released: Notify::new(),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Subscribe to published snapshots
    pub fn subscribe(&self) -> watch::Receiver<Arc<FloorSnapshot>> {
        self.snapshot.subscribe()
    }

    /// Subscribe to menu replacements
    pub fn subscribe_menu(&self) -> watch::Receiver<Arc<MenuCatalog>> {
        self.menu.subscribe()
    }

    pub fn current(&self) -> Arc<FloorSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn menu(&self) -> Arc<MenuCatalog> {
        self.menu.borrow().clone()
    }

    pub fn is_reconciling(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Fetch tables and orders concurrently and publish a new snapshot
    ///
    /// Returns [`ReconcileOutcome::Coalesced`] without any request when a
    /// reconciliation is already running.
    pub async fn reconcile(&self) -> ClientResult<ReconcileOutcome> {
        let Some(_guard) = InFlightGuard::try_acquire(&self.in_flight, &self.released) else {
            tracing::debug!("Reconcile already in flight, coalescing");
            return Ok(ReconcileOutcome::Coalesced);
        };

        let (tables, orders) = tokio::join!(self.backend.list_tables(), self.backend.list_orders());
        self.apply(tables, orders).map(ReconcileOutcome::Applied)
    }

    /// Initial load: menu, tables and orders in parallel
    ///
    /// A menu failure is reported but the snapshot is still built, with raw
    /// item ids in place of names. Waits for a running reconciliation to
    /// finish instead of coalescing into it.
    pub async fn bootstrap(&self) -> ClientResult<Arc<FloorSnapshot>> {
        let _guard = loop {
            // register before the attempt so a release in between is not missed
            let released = self.released.notified();
            tokio::pin!(released);
            released.as_mut().enable();

            if let Some(guard) = InFlightGuard::try_acquire(&self.in_flight, &self.released) {
                break guard;
            }
            tracing::debug!("Reconcile in flight, bootstrap waiting");
            released.await;
        };

        let (menu, tables, orders) = tokio::join!(
            self.backend.list_menu(),
            self.backend.list_tables(),
            self.backend.list_orders()
        );

        match menu {
            Ok(items) => {
                tracing::info!(items = items.len(), "Menu loaded");
                self.menu.send_replace(Arc::new(MenuCatalog::new(items)));
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = %e.kind(), "Menu unavailable at startup");
                self.notifier.notify(Notice::failure(&e));
            }
        }

        self.apply(tables, orders)
    }

    /// Replace the menu and re-resolve item names in the current snapshot
    pub async fn refresh_menu(&self) -> ClientResult<Arc<MenuCatalog>> {
        let items = match self.backend.list_menu().await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, kind = %e.kind(), "Menu refresh failed");
                self.notifier.notify(Notice::failure(&e));
                return Err(e);
            }
        };

        let catalog = Arc::new(MenuCatalog::new(items));
        self.menu.send_replace(catalog.clone());

        let mut generation = 0;
        self.snapshot.send_modify(|current| {
            generation = self.next_generation();
            *current = Arc::new(current.relabel(generation, &catalog));
        });
        tracing::info!(items = catalog.len(), generation, "Menu replaced");
        Ok(catalog)
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn apply(
        &self,
        tables: ClientResult<Vec<DiningTable>>,
        orders: ClientResult<Vec<Order>>,
    ) -> ClientResult<Arc<FloorSnapshot>> {
        let (tables, orders) = match (tables, orders) {
            (Ok(tables), Ok(orders)) => (tables, orders),
            (Err(e), Err(_)) => return Err(self.report(e)),
            (Err(e), Ok(_)) => return Err(self.report(ClientError::partial(Resource::Tables, e))),
            (Ok(_), Err(e)) => return Err(self.report(ClientError::partial(Resource::Orders, e))),
        };

        let mut published = None;
        // generation and menu are read inside the channel lock so publication
        // order matches generation order and a concurrent menu swap is never
        // overwritten by stale names
        self.snapshot.send_modify(|current| {
            let menu = self.menu();
            let next = Arc::new(FloorSnapshot::build(
                self.next_generation(),
                tables,
                orders,
                &menu,
            ));
            *current = next.clone();
            published = Some(next);
        });

        match published {
            Some(snapshot) => {
                tracing::debug!(
                    generation = snapshot.generation,
                    tables = snapshot.tables.len(),
                    occupied = snapshot.occupied_count(),
                    "Snapshot published"
                );
                Ok(snapshot)
            }
            None => Ok(self.current()),
        }
    }

    fn report(&self, err: ClientError) -> ClientError {
        tracing::warn!(error = %err, kind = %err.kind(), "Reconcile failed, keeping previous snapshot");
        self.notifier.notify(Notice::Failure {
            kind: err.kind(),
            message: format!("{RECONCILE_FAILED} {}", err.user_message()),
        });
        err
    }
}
