use crate::domain::checkout::{CheckoutId, FieldError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

/// Coarse classification of a [`SyncError`].
///
/// None of these are fatal to the process: every kind leaves the local cart
/// exactly as it was before the failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The gateway answered but rejected the request with field errors.
    Field,
    /// Connectivity, timeout, HTTP or GraphQL protocol failure.
    Transport,
    /// The operation needs a checkout session and there is none (or it is gone).
    Precondition,
    /// Local input validation failed before anything was sent.
    Validation,
    /// Reading or writing persisted client state failed.
    Storage,
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{operation} rejected: {}", render_field_errors(.errors))]
    Rejected {
        operation: &'static str,
        errors: Vec<FieldError>,
    },
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("GraphQL error: {0}")]
    Protocol(String),
    #[error("not authenticated: {0}")]
    Unauthenticated(String),
    #[error("no active checkout session")]
    NoSession,
    #[error("checkout {0} no longer exists on the gateway")]
    SessionExpired(CheckoutId),
    #[error("address is missing required field `{field}`")]
    InvalidAddress { field: &'static str },
    #[error("checkout {0} carries no total price")]
    MissingTotal(CheckoutId),
    #[error("checkout completion returned no order (confirmation needed: {confirmation_needed})")]
    MissingOrder { confirmation_needed: bool },
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Rejected { .. } => ErrorKind::Field,
            SyncError::Http(_)
            | SyncError::Status { .. }
            | SyncError::Protocol(_)
            | SyncError::Unauthenticated(_)
            | SyncError::MissingTotal(_)
            | SyncError::MissingOrder { .. } => ErrorKind::Transport,
            SyncError::NoSession | SyncError::SessionExpired(_) => ErrorKind::Precondition,
            SyncError::InvalidAddress { .. } => ErrorKind::Validation,
            SyncError::IoError(_) | SyncError::Serialization(_) | SyncError::InternalError(_) => {
                ErrorKind::Storage
            }
            #[cfg(feature = "storage-rocksdb")]
            SyncError::RocksDb(_) => ErrorKind::Storage,
        }
    }

    /// Whether a transport layer may retry the request that produced this error.
    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            SyncError::Status { status, .. } => (500..600).contains(status),
            SyncError::Protocol(message) => is_cursor_error(message),
            _ => false,
        }
    }
}

/// Paginated listings occasionally fail with a stale cursor; a retry clears it.
pub(crate) fn is_cursor_error(message: &str) -> bool {
    message.contains("cursor") && message.contains("does not exist")
}

fn render_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| match &e.field {
            Some(field) => format!("{}: {}", field, e.message),
            None => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}
