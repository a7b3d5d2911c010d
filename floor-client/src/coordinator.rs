//! InteractionCoordinator - 交互状态机
//!
//! Three independent state machines, one per interaction:
//!
//! - Occupy / Vacate: `Idle -> Confirming -> InFlight -> Idle`
//! - Compose order:   `Idle -> Composing -> Submitting -> Idle`
//!
//! Locks guard single-field swaps only and are never held across an await.
//! Lock order when both are needed: `compose`, then `draft`.

use crate::client::{FloorBackend, validate_order_request};
use crate::draft::{OrderDraft, OrderDraftManager};
use crate::error::ClientError;
use crate::menu::MenuCatalog;
use crate::notify::{Notice, Notifier};
use crate::scheduler::{ActivityGauge, RefreshHandle, RefreshReason};
use crate::search::{DebouncedSearch, Suggestions};
use parking_lot::Mutex;
use shared::{MenuItem, Order, TableId};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Confirmable table action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableAction {
    Occupy,
    Vacate,
}

impl TableAction {
    fn refresh_reason(self) -> RefreshReason {
        match self {
            TableAction::Occupy => RefreshReason::Occupied,
            TableAction::Vacate => RefreshReason::Vacated,
        }
    }
}

impl fmt::Display for TableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableAction::Occupy => f.write_str("occupy"),
            TableAction::Vacate => f.write_str("vacate"),
        }
    }
}

/// Occupy / Vacate dialog state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfirmState {
    #[default]
    Idle,
    Confirming { table_id: TableId },
    InFlight { table_id: TableId },
}

impl ConfirmState {
    pub fn table_id(&self) -> Option<&str> {
        match self {
            ConfirmState::Idle => None,
            ConfirmState::Confirming { table_id } | ConfirmState::InFlight { table_id } => {
                Some(table_id)
            }
        }
    }
}

/// Order composer state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ComposeState {
    #[default]
    Idle,
    Composing { table_id: TableId },
    Submitting { table_id: TableId },
}

/// Transition rejected by a state machine
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("{action} for table {table_id} is still in flight")]
    ActionInFlight { action: TableAction, table_id: TableId },

    #[error("no {action} is waiting for confirmation")]
    NotConfirming { action: TableAction },

    #[error("order for table {table_id} is being submitted")]
    Submitting { table_id: TableId },

    #[error("order composer is not open")]
    NotComposing,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum InteractionError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Returns a machine to its resting state if the in-flight future is dropped
/// before the call settles
struct ConfirmReset<'a>(&'a Mutex<ConfirmState>);

impl Drop for ConfirmReset<'_> {
    fn drop(&mut self) {
        *self.0.lock() = ConfirmState::Idle;
    }
}

/// Puts `Submitting` back to `Composing` unless disarmed
struct ComposeRollback<'a> {
    state: &'a Mutex<ComposeState>,
    table_id: TableId,
    armed: bool,
}

impl Drop for ComposeRollback<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock();
        if matches!(*state, ComposeState::Submitting { .. }) {
            *state = ComposeState::Composing {
                table_id: std::mem::take(&mut self.table_id),
            };
        }
    }
}

pub struct InteractionCoordinator<B: FloorBackend> {
    backend: Arc<B>,
    occupy: Mutex<ConfirmState>,
    vacate: Mutex<ConfirmState>,
    compose: Mutex<ComposeState>,
    draft: Mutex<OrderDraftManager>,
    search: DebouncedSearch,
    refresh: RefreshHandle,
    activity: ActivityGauge,
    notifier: Arc<dyn Notifier>,
}

impl<B: FloorBackend> InteractionCoordinator<B> {
    /// Must be called inside a tokio runtime; spawns the search worker
    pub fn new(
        backend: Arc<B>,
        menu: watch::Receiver<Arc<MenuCatalog>>,
        refresh: RefreshHandle,
        activity: ActivityGauge,
        notifier: Arc<dyn Notifier>,
        search_debounce: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            backend,
            occupy: Mutex::new(ConfirmState::Idle),
            vacate: Mutex::new(ConfirmState::Idle),
            compose: Mutex::new(ComposeState::Idle),
            draft: Mutex::new(OrderDraftManager::new()),
            search: DebouncedSearch::spawn(menu, search_debounce, shutdown),
            refresh,
            activity,
            notifier,
        }
    }

    fn machine(&self, action: TableAction) -> &Mutex<ConfirmState> {
        match action {
            TableAction::Occupy => &self.occupy,
            TableAction::Vacate => &self.vacate,
        }
    }

    // ========== Occupy / Vacate ==========

    /// User gesture on a table; a newer gesture retargets a pending dialog
    pub fn begin(&self, action: TableAction, table_id: &str) -> Result<(), TransitionError> {
        let mut state = self.machine(action).lock();
        if let ConfirmState::InFlight { table_id: busy } = &*state {
            return Err(TransitionError::ActionInFlight {
                action,
                table_id: busy.clone(),
            });
        }
        tracing::debug!(action = %action, table_id = %table_id, "Awaiting confirmation");
        *state = ConfirmState::Confirming {
            table_id: table_id.to_string(),
        };
        Ok(())
    }

    /// Issue the confirmed call and wait for it to settle
    ///
    /// Whatever the outcome, the machine ends `Idle` and a refresh is
    /// requested. A failure is reported to the notifier and returned.
    pub async fn confirm(&self, action: TableAction) -> Result<(), InteractionError> {
        let machine = self.machine(action);
        let table_id = {
            let mut state = machine.lock();
            match &*state {
                ConfirmState::Confirming { table_id } => {
                    let table_id = table_id.clone();
                    *state = ConfirmState::InFlight {
                        table_id: table_id.clone(),
                    };
                    table_id
                }
                ConfirmState::InFlight { table_id } => {
                    return Err(TransitionError::ActionInFlight {
                        action,
                        table_id: table_id.clone(),
                    }
                    .into());
                }
                ConfirmState::Idle => return Err(TransitionError::NotConfirming { action }.into()),
            }
        };

        let reset = ConfirmReset(machine);
        let token = self.activity.enter();

        let result = match action {
            TableAction::Occupy => self.backend.occupy(&table_id).await,
            TableAction::Vacate => self.backend.vacate(&table_id).await,
        };

        if action == TableAction::Vacate {
            self.discard_draft_after_vacate();
        }

        drop(token);
        drop(reset);
        self.refresh.request(action.refresh_reason());

        match result {
            Ok(()) => {
                tracing::info!(action = %action, table_id = %table_id, "Table action completed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    action = %action,
                    table_id = %table_id,
                    error = %e,
                    kind = %e.kind(),
                    "Table action failed"
                );
                self.notifier.notify(Notice::failure(&e));
                Err(e.into())
            }
        }
    }

    /// Close the dialog without calling the backend; still refreshes
    pub fn cancel(&self, action: TableAction) -> Result<(), TransitionError> {
        if self.close_dialog(action)? {
            self.refresh.request(RefreshReason::DialogClosed);
        }
        Ok(())
    }

    /// Close the dialog without calling the backend or refreshing
    pub fn dismiss(&self, action: TableAction) -> Result<(), TransitionError> {
        self.close_dialog(action).map(|_| ())
    }

    fn close_dialog(&self, action: TableAction) -> Result<bool, TransitionError> {
        let mut state = self.machine(action).lock();
        match &*state {
            ConfirmState::Idle => Ok(false),
            ConfirmState::Confirming { .. } => {
                *state = ConfirmState::Idle;
                Ok(true)
            }
            ConfirmState::InFlight { table_id } => Err(TransitionError::ActionInFlight {
                action,
                table_id: table_id.clone(),
            }),
        }
    }

    pub fn state(&self, action: TableAction) -> ConfirmState {
        self.machine(action).lock().clone()
    }

    /// Whether the control for `action` on `table_id` must stay disabled
    pub fn is_control_disabled(&self, action: TableAction, table_id: &str) -> bool {
        matches!(&*self.machine(action).lock(), ConfirmState::InFlight { table_id: busy } if busy == table_id)
    }

    fn discard_draft_after_vacate(&self) {
        let mut compose = self.compose.lock();
        // an order already on its way keeps its draft
        if matches!(*compose, ComposeState::Submitting { .. }) {
            return;
        }
        *compose = ComposeState::Idle;
        self.draft.lock().reset();
        self.search.clear();
    }

    // ========== Order composer ==========

    /// Open the composer; a draft kept for the same table is restored
    pub fn open_composer(&self, table_id: &str) -> Result<OrderDraft, TransitionError> {
        let mut compose = self.compose.lock();
        if let ComposeState::Submitting { table_id: busy } = &*compose {
            return Err(TransitionError::Submitting {
                table_id: busy.clone(),
            });
        }
        *compose = ComposeState::Composing {
            table_id: table_id.to_string(),
        };
        let draft = self.draft.lock().open(table_id).clone();
        self.search.clear();
        Ok(draft)
    }

    /// Keystroke in the search box
    pub fn search_input(&self, text: &str) {
        self.search.input(text);
    }

    pub fn suggestions(&self) -> Suggestions {
        self.search.current()
    }

    pub fn subscribe_suggestions(&self) -> watch::Receiver<Suggestions> {
        self.search.subscribe()
    }

    pub fn search(&self) -> &DebouncedSearch {
        &self.search
    }

    /// Pick a suggestion: add it to the draft and clear the query
    ///
    /// Returns `false` when the item was already in the draft.
    pub fn select_suggestion(&self, item: MenuItem) -> Result<bool, TransitionError> {
        let compose = self.compose.lock();
        match &*compose {
            ComposeState::Composing { .. } => {}
            ComposeState::Submitting { table_id } => {
                return Err(TransitionError::Submitting {
                    table_id: table_id.clone(),
                });
            }
            ComposeState::Idle => return Err(TransitionError::NotComposing),
        }
        let added = self.draft.lock().add(item);
        self.search.clear();
        Ok(added)
    }

    pub fn remove_item(&self, item_id: &str) -> bool {
        let compose = self.compose.lock();
        if !matches!(*compose, ComposeState::Composing { .. }) {
            return false;
        }
        self.draft.lock().remove(item_id)
    }

    pub fn draft(&self) -> Option<OrderDraft> {
        self.draft.lock().current().cloned()
    }

    pub fn compose_state(&self) -> ComposeState {
        self.compose.lock().clone()
    }

    /// Submit the draft as a new order
    ///
    /// Validation failures never reach the backend and leave the composer
    /// open. A backend failure returns to `Composing` with the draft intact;
    /// success closes the composer, resets the draft and refreshes.
    pub async fn submit_order(&self) -> Result<Order, InteractionError> {
        let validated = {
            let mut compose = self.compose.lock();
            let table_id = match &*compose {
                ComposeState::Composing { table_id } => table_id.clone(),
                ComposeState::Submitting { table_id } => {
                    return Err(TransitionError::Submitting {
                        table_id: table_id.clone(),
                    }
                    .into());
                }
                ComposeState::Idle => return Err(TransitionError::NotComposing.into()),
            };
            let items = self.draft.lock().to_id_list();

            match validate_order_request(&table_id, &items) {
                Ok(()) => {
                    *compose = ComposeState::Submitting {
                        table_id: table_id.clone(),
                    };
                    Ok((table_id, items))
                }
                Err(e) => Err((table_id, e)),
            }
        };
        // notifier runs with no lock held; it may call back into the coordinator
        let (table_id, items) = match validated {
            Ok(request) => request,
            Err((table_id, e)) => {
                tracing::debug!(table_id = %table_id, error = %e, "Order rejected locally");
                self.notifier.notify(Notice::failure(&e));
                return Err(e.into());
            }
        };

        let mut rollback = ComposeRollback {
            state: &self.compose,
            table_id: table_id.clone(),
            armed: true,
        };
        let token = self.activity.enter();
        let result = self.backend.create_order(&table_id, &items).await;
        drop(token);

        match result {
            Ok(order) => {
                rollback.armed = false;
                {
                    let mut compose = self.compose.lock();
                    *compose = ComposeState::Idle;
                    self.draft.lock().reset();
                }
                self.search.clear();
                tracing::info!(order_id = %order.id, table_id = %table_id, "Order submitted");
                self.notifier.notify(Notice::OrderCreated {
                    order_id: order.id.clone(),
                });
                self.refresh.request(RefreshReason::OrderCreated);
                Ok(order)
            }
            Err(e) => {
                drop(rollback);
                tracing::warn!(table_id = %table_id, error = %e, kind = %e.kind(), "Order submission failed");
                self.notifier.notify(Notice::failure(&e));
                Err(e.into())
            }
        }
    }

    /// Close the composer and discard the draft
    pub fn cancel_composer(&self) -> Result<(), TransitionError> {
        let mut compose = self.compose.lock();
        if let ComposeState::Submitting { table_id } = &*compose {
            return Err(TransitionError::Submitting {
                table_id: table_id.clone(),
            });
        }
        *compose = ComposeState::Idle;
        self.draft.lock().reset();
        self.search.clear();
        Ok(())
    }

    /// Close the composer but keep the draft for a later reopen
    pub fn dismiss_composer(&self) -> Result<(), TransitionError> {
        let mut compose = self.compose.lock();
        if let ComposeState::Submitting { table_id } = &*compose {
            return Err(TransitionError::Submitting {
                table_id: table_id.clone(),
            });
        }
        *compose = ComposeState::Idle;
        self.search.clear();
        Ok(())
    }
}
