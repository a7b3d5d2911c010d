//! Client error types

use std::fmt;
use thiserror::Error;

/// Collection fetched from the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Menu,
    Tables,
    Orders,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Menu => write!(f, "menu"),
            Resource::Tables => write!(f, "tables"),
            Resource::Orders => write!(f, "orders"),
        }
    }
}

/// Error taxonomy reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request could not complete or returned a non-success status
    Network,
    /// Input rejected locally before any request was made
    Validation,
    /// One of the two reconciliation fetches failed while the other succeeded
    PartialData,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Validation => "validation",
            ErrorKind::PartialData => "partial_data",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client error type
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    /// HTTP request failed or the backend rejected it
    #[error("{message}")]
    Network {
        /// Response status, `None` when no response arrived
        status: Option<u16>,
        /// Backend `detail`, or a generic message for the operation
        message: String,
    },

    /// Validation error
    #[error("{0}")]
    Validation(String),

    /// Reconciliation got only half of its data
    #[error("{resource} unavailable: {source}")]
    PartialData {
        resource: Resource,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    pub fn network(status: Option<u16>, message: impl Into<String>) -> Self {
        ClientError::Network {
            status,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    pub fn partial(resource: Resource, source: ClientError) -> Self {
        ClientError::PartialData {
            resource,
            source: Box::new(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Network { .. } => ErrorKind::Network,
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::PartialData { .. } => ErrorKind::PartialData,
        }
    }

    /// HTTP status of the failed response, if one arrived
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Network { status, .. } => *status,
            ClientError::PartialData { source, .. } => source.status(),
            ClientError::Validation(_) => None,
        }
    }

    /// Text shown to the user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network { message, .. } => message.clone(),
            ClientError::Validation(message) => message.clone(),
            ClientError::PartialData { source, .. } => source.user_message(),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
