//! User notices
//!
//! Engine components never render anything; they hand a [`Notice`] to the
//! configured [`Notifier`] and the presentation layer decides how to show it.

use crate::error::{ClientError, ErrorKind};
use tokio::sync::mpsc;

/// Something the user should be told about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A fetch or mutation failed
    Failure { kind: ErrorKind, message: String },
    /// An order was accepted by the backend
    OrderCreated { order_id: String },
}

impl Notice {
    pub fn failure(err: &ClientError) -> Self {
        Notice::Failure {
            kind: err.kind(),
            message: err.user_message(),
        }
    }

    /// Text to display
    pub fn message(&self) -> String {
        match self {
            Notice::Failure { message, .. } => message.clone(),
            Notice::OrderCreated { order_id } => format!("Order {order_id} created successfully!"),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Notice::Failure { .. })
    }
}

/// Sink for user notices
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

fn log_notice(notice: &Notice) {
    match notice {
        Notice::Failure { kind, message } => {
            tracing::warn!(kind = %kind, message = %message, "User notice");
        }
        Notice::OrderCreated { order_id } => {
            tracing::info!(order_id = %order_id, "User notice: order created");
        }
    }
}

/// Writes notices to the log only
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        log_notice(&notice);
    }
}

/// Forwards notices to a channel for the presentation layer
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        log_notice(&notice);
        if self.tx.send(notice).is_err() {
            tracing::debug!("Notice receiver dropped");
        }
    }
}
