//! PollScheduler - 定时刷新
//!
//! Every reconciliation goes through this loop: the fixed-cadence tick and
//! on-demand requests from the coordinator. Reconciliations run one after
//! another; requests that pile up while one is running collapse into a
//! single follow-up.

use crate::client::FloorBackend;
use crate::config::clamp_poll_interval;
use crate::sync::{ReconcileOutcome, TableSynchronizer};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Why a reconciliation was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    Tick,
    Occupied,
    Vacated,
    OrderCreated,
    DialogClosed,
    Manual,
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefreshReason::Tick => "tick",
            RefreshReason::Occupied => "occupied",
            RefreshReason::Vacated => "vacated",
            RefreshReason::OrderCreated => "order_created",
            RefreshReason::DialogClosed => "dialog_closed",
            RefreshReason::Manual => "manual",
        };
        f.write_str(name)
    }
}

/// Sender side for on-demand refreshes
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: mpsc::UnboundedSender<RefreshReason>,
}

impl RefreshHandle {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RefreshReason>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Ask for a reconciliation; never blocks
    pub fn request(&self, reason: RefreshReason) {
        if self.tx.send(reason).is_err() {
            tracing::debug!(reason = %reason, "Scheduler stopped, refresh request dropped");
        }
    }
}

/// Counts outstanding mutations (occupy, vacate, order submit)
#[derive(Debug, Clone, Default)]
pub struct ActivityGauge(Arc<AtomicUsize>);

impl ActivityGauge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a mutation as started; it ends when the token drops
    pub fn enter(&self) -> ActivityToken {
        self.0.fetch_add(1, Ordering::AcqRel);
        ActivityToken(self.0.clone())
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire) > 0
    }
}

#[derive(Debug)]
pub struct ActivityToken(Arc<AtomicUsize>);

impl Drop for ActivityToken {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

pub struct PollScheduler<B: FloorBackend> {
    sync: Arc<TableSynchronizer<B>>,
    poll_interval: Duration,
    suppress_during_mutation: bool,
    activity: ActivityGauge,
    requests: mpsc::UnboundedReceiver<RefreshReason>,
    shutdown: CancellationToken,
}

impl<B: FloorBackend + 'static> PollScheduler<B> {
    pub fn new(
        sync: Arc<TableSynchronizer<B>>,
        poll_interval: Duration,
        activity: ActivityGauge,
        requests: mpsc::UnboundedReceiver<RefreshReason>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            sync,
            poll_interval: clamp_poll_interval(poll_interval),
            suppress_during_mutation: true,
            activity,
            requests,
            shutdown,
        }
    }

    pub fn with_poll_suppression(mut self, enabled: bool) -> Self {
        self.suppress_during_mutation = enabled;
        self
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run until shutdown
    pub async fn run(mut self) {
        tracing::info!(
            interval_secs = self.poll_interval.as_secs_f64(),
            suppress_during_mutation = self.suppress_during_mutation,
            "PollScheduler started"
        );

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // skip immediate tick

        let mut requests_open = true;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("PollScheduler shutting down");
                    break;
                }

                _ = ticker.tick() => {
                    if self.suppress_during_mutation && self.activity.is_busy() {
                        tracing::debug!("Mutation in flight, skipping scheduled refresh");
                        continue;
                    }
                    self.reconcile(RefreshReason::Tick).await;
                }

                reason = self.requests.recv(), if requests_open => match reason {
                    Some(reason) => {
                        let mut collapsed = 0usize;
                        while self.requests.try_recv().is_ok() {
                            collapsed += 1;
                        }
                        if collapsed > 0 {
                            tracing::debug!(collapsed, "Collapsed queued refresh requests");
                        }
                        self.reconcile(reason).await;
                    }
                    None => {
                        tracing::debug!("All refresh handles dropped");
                        requests_open = false;
                    }
                },
            }
        }

        tracing::info!("PollScheduler stopped");
    }

    async fn reconcile(&self, reason: RefreshReason) {
        tokio::select! {
            _ = self.shutdown.cancelled() => {}
            result = self.sync.reconcile() => match result {
                Ok(ReconcileOutcome::Applied(snapshot)) => {
                    tracing::debug!(reason = %reason, generation = snapshot.generation, "Refresh applied");
                }
                Ok(ReconcileOutcome::Coalesced) => {
                    tracing::debug!(reason = %reason, "Refresh coalesced into running reconcile");
                }
                // already logged and reported by the synchronizer
                Err(e) => {
                    tracing::debug!(reason = %reason, kind = %e.kind(), "Refresh failed");
                }
            },
        }
    }
}
