//! FloorSession - wires the engine components together
//!
//! One backend, one synchronizer, one scheduler loop, one coordinator. The
//! session owns the shutdown token and the scheduler task.

use crate::client::{FloorBackend, RemoteStateClient};
use crate::config::ClientConfig;
use crate::coordinator::InteractionCoordinator;
use crate::error::ClientResult;
use crate::notify::Notifier;
use crate::scheduler::{ActivityGauge, PollScheduler, RefreshHandle, RefreshReason};
use crate::snapshot::FloorSnapshot;
use crate::sync::TableSynchronizer;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct FloorSession<B: FloorBackend> {
    config: ClientConfig,
    sync: Arc<TableSynchronizer<B>>,
    coordinator: Arc<InteractionCoordinator<B>>,
    refresh: RefreshHandle,
    activity: ActivityGauge,
    requests: Option<mpsc::UnboundedReceiver<RefreshReason>>,
    shutdown: CancellationToken,
    scheduler: Option<JoinHandle<()>>,
}

impl FloorSession<RemoteStateClient> {
    /// Session against the HTTP backend at `config.base_url`
    pub fn connect(config: ClientConfig, notifier: Arc<dyn Notifier>) -> ClientResult<Self> {
        let backend = RemoteStateClient::new(&config)?;
        tracing::info!(base_url = %backend.base_url(), "Floor backend configured");
        Ok(Self::with_backend(config, Arc::new(backend), notifier))
    }
}

impl<B: FloorBackend + 'static> FloorSession<B> {
    /// Must be called inside a tokio runtime
    pub fn with_backend(config: ClientConfig, backend: Arc<B>, notifier: Arc<dyn Notifier>) -> Self {
        let shutdown = CancellationToken::new();
        let sync = Arc::new(TableSynchronizer::new(backend.clone(), notifier.clone()));
        let (refresh, requests) = RefreshHandle::channel();
        let activity = ActivityGauge::new();
        let coordinator = Arc::new(InteractionCoordinator::new(
            backend,
            sync.subscribe_menu(),
            refresh.clone(),
            activity.clone(),
            notifier,
            config.search_debounce,
            shutdown.child_token(),
        ));

        Self {
            config,
            sync,
            coordinator,
            refresh,
            activity,
            requests: Some(requests),
            shutdown,
            scheduler: None,
        }
    }

    /// Initial load, then start the poll loop
    ///
    /// The loop is started even when the initial load fails, so the floor
    /// recovers on the next tick.
    pub async fn start(&mut self) -> ClientResult<Arc<FloorSnapshot>> {
        let loaded = self.sync.bootstrap().await;

        if let Some(requests) = self.requests.take() {
            let scheduler = PollScheduler::new(
                self.sync.clone(),
                self.config.poll_interval,
                self.activity.clone(),
                requests,
                self.shutdown.child_token(),
            )
            .with_poll_suppression(self.config.suppress_poll_during_mutation);
            self.scheduler = Some(scheduler.spawn());
        }

        match &loaded {
            Ok(snapshot) => tracing::info!(
                generation = snapshot.generation,
                tables = snapshot.tables.len(),
                menu_items = self.sync.menu().len(),
                "Floor session started"
            ),
            Err(e) => tracing::warn!(error = %e, "Floor session started without initial data"),
        }
        loaded
    }

    pub fn snapshots(&self) -> watch::Receiver<Arc<FloorSnapshot>> {
        self.sync.subscribe()
    }

    pub fn current(&self) -> Arc<FloorSnapshot> {
        self.sync.current()
    }

    pub fn coordinator(&self) -> Arc<InteractionCoordinator<B>> {
        self.coordinator.clone()
    }

    pub fn synchronizer(&self) -> Arc<TableSynchronizer<B>> {
        self.sync.clone()
    }

    pub fn refresh_handle(&self) -> RefreshHandle {
        self.refresh.clone()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Stop the poll loop and the search worker
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.scheduler.take()
            && let Err(e) = handle.await
        {
            tracing::error!(error = %e, "PollScheduler task failed");
        }
        tracing::info!("Floor session stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::TableAction;
    use crate::test_support::{
        Call, FakeBackend, RecordingNotifier, free_table, occupied_table, order,
    };
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_occupy_flows_into_new_snapshot() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_tables(Ok(vec![free_table("3")]));
        let notifier = Arc::new(RecordingNotifier::default());
        let mut session = FloorSession::with_backend(ClientConfig::default(), backend.clone(), notifier);

        let first = session.start().await.unwrap();
        assert!(!first.table("3").unwrap().occupied);

        let mut snapshots = session.snapshots();
        snapshots.borrow_and_update();

        backend.set_tables(Ok(vec![occupied_table("3")]));
        let coordinator = session.coordinator();
        coordinator.begin(TableAction::Occupy, "3").unwrap();
        coordinator.confirm(TableAction::Occupy).await.unwrap();

        tokio::time::timeout(Duration::from_secs(1), snapshots.changed())
            .await
            .unwrap()
            .unwrap();
        let latest = snapshots.borrow().clone();
        assert!(latest.table("3").unwrap().occupied);
        assert!(latest.generation > first.generation);
        assert_eq!(backend.count(&Call::Occupy("3".into())), 1);

        session.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_vacate_keeps_table_occupied() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_tables(Ok(vec![occupied_table("4")]));
        backend.set_orders(Ok(vec![order("5", "4", &["9"])]));
        backend.set_vacate(Err(crate::ClientError::network(Some(400), "Table not occupied")));
        let notifier = Arc::new(RecordingNotifier::default());
        let mut session =
            FloorSession::with_backend(ClientConfig::default(), backend.clone(), notifier.clone());

        let before = session.start().await.unwrap();
        assert!(before.table("4").unwrap().occupied);

        let coordinator = session.coordinator();
        coordinator.begin(TableAction::Vacate, "4").unwrap();
        assert!(coordinator.confirm(TableAction::Vacate).await.is_err());
        assert_eq!(notifier.messages(), vec!["Table not occupied"]);

        // let the follow-up refresh run
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(backend.count(&Call::ListTables), 2);

        let after = session.current();
        assert!(after.generation > before.generation);
        assert_eq!(after.tables, before.tables);
        let table = after.table("4").unwrap();
        assert!(table.occupied);
        assert_eq!(table.orders[0].order.id, "5");

        session.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_failure_still_polls() {
        let backend = Arc::new(FakeBackend::new());
        backend.set_tables(Err(crate::ClientError::network(None, "Failed to fetch tables")));
        let notifier = Arc::new(RecordingNotifier::default());
        let mut session = FloorSession::with_backend(ClientConfig::default(), backend.clone(), notifier);

        assert!(session.start().await.is_err());

        backend.set_tables(Ok(vec![free_table("1")]));
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(session.current().tables.len(), 1);

        session.shutdown().await;
    }
}
