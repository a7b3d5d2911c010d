//! Floor Client - state synchronization engine for the floor-management backend
//!
//! Pulls tables, orders and the menu from the backend, reconciles them into
//! immutable [`FloorSnapshot`]s, and coordinates the user-facing actions
//! (occupy, vacate, compose order) so they never race the background poll.
//!
//! ```no_run
//! use std::sync::Arc;
//! use floor_client::{ClientConfig, FloorSession, LogNotifier};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("http://localhost:8000");
//! let mut session = FloorSession::connect(config, Arc::new(LogNotifier))?;
//! session.start().await?;
//!
//! let coordinator = session.coordinator();
//! coordinator.begin(floor_client::TableAction::Occupy, "3")?;
//! coordinator.confirm(floor_client::TableAction::Occupy).await.ok();
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod coordinator;
pub mod draft;
pub mod error;
pub mod logger;
pub mod menu;
pub mod notify;
pub mod scheduler;
pub mod search;
pub mod session;
pub mod snapshot;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{FloorBackend, Operation, RemoteStateClient, validate_order_request};
pub use config::{ClientConfig, ConfigError, LogConfig};
pub use coordinator::{
    ComposeState, ConfirmState, InteractionCoordinator, InteractionError, TableAction,
    TransitionError,
};
pub use draft::{OrderDraft, OrderDraftManager};
pub use error::{ClientError, ClientResult, ErrorKind, Resource};
pub use menu::MenuCatalog;
pub use notify::{ChannelNotifier, LogNotifier, Notice, Notifier};
pub use scheduler::{ActivityGauge, PollScheduler, RefreshHandle, RefreshReason};
pub use search::{DebouncedSearch, SearchIndex, Suggestions};
pub use session::FloorSession;
pub use snapshot::{FloorSnapshot, OrderView, TableSnapshot};
pub use sync::{ReconcileOutcome, TableSynchronizer};

// Re-export shared types for convenience
pub use shared::{DiningTable, FreeTable, ItemId, MenuItem, Order, OrderId, TableId};
