//! Error types for the transaction engine.
//!
//! Three layers, from the outside in:
//!
//! - [`ModelError`]: a collaborator (usually the backend model) failed.
//! - [`CancellationReason`]: the user backed out of a dialog. Not a defect.
//! - [`TransactionError`]: what every public operation returns.
//!
//! Callers use [`TransactionError::is_cancellation`] to decide whether an error dialog
//! is warranted at all.

use crate::model::ProgrammingModel;
use thiserror::Error;

/// Errors reported by the backend model and other collaborators.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// A request reached the backend and was rejected.
    #[error("Backend request failed (status {status:?}): {message}")]
    Request { status: Option<u16>, message: String },

    /// Metadata for a path or operation could not be resolved.
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// The addressed context does not exist (anymore).
    #[error("Context not found: {0}")]
    NotFound(String),
}

impl ModelError {
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        ModelError::Request {
            status: Some(status),
            message: message.into(),
        }
    }

    /// The backend refused because somebody else holds changes on the object.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ModelError::Request { status: Some(409), .. })
    }
}

/// Why the user stopped an operation.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CancellationReason {
    #[error("action parameter dialog was cancelled")]
    ParameterDialogCancelled,

    #[error("creation dialog was cancelled")]
    CreateDialogCancelled,

    #[error("discarding changes was not confirmed")]
    DiscardDeclined,

    #[error("deletion was not confirmed")]
    DeleteDeclined,
}

/// Errors returned by the lifecycle controller and the action invoker.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransactionError {
    /// A required document context was not supplied.
    #[error("{operation} requires a document context")]
    MissingContext { operation: &'static str },

    /// Edit, save, cancel, delete and create need a draft or sticky session service.
    #[error("{operation} is only allowed for draft or sticky session supported services (found {model:?})")]
    UnsupportedProgrammingModel {
        operation: &'static str,
        model: ProgrammingModel,
    },

    /// The request failed validation before anything was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cancelled: {0}")]
    Cancelled(#[from] CancellationReason),

    /// Canonical signal for every non-cancellation failure of `create_document`.
    #[error("Creation failed: {source}")]
    CreationFailed {
        #[source]
        source: Box<TransactionError>,
    },

    #[error("Action {action} failed: {source}")]
    ActionFailed {
        action: String,
        #[source]
        source: ModelError,
    },

    /// The object is being edited by another user.
    #[error("Object is locked by {user}")]
    Locked { user: String },

    #[error("None of the selected objects can be deleted")]
    NothingDeletable,

    /// Another lifecycle operation on the same context has not finished yet.
    #[error("An operation is already running on {path}")]
    OperationInProgress { path: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl TransactionError {
    pub fn is_cancellation(&self) -> bool {
        self.cancellation_reason().is_some()
    }

    pub fn cancellation_reason(&self) -> Option<CancellationReason> {
        match self {
            TransactionError::Cancelled(reason) => Some(*reason),
            _ => None,
        }
    }

    pub(crate) fn creation_failed(source: TransactionError) -> Self {
        match source {
            already @ TransactionError::CreationFailed { .. } => already,
            other => TransactionError::CreationFailed {
                source: Box::new(other),
            },
        }
    }
}

/// Errors raised while loading a [`TransactionConfig`](crate::config::TransactionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type Result<T, E = TransactionError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_recognised_by_identity() {
        let err: TransactionError = CancellationReason::DiscardDeclined.into();
        assert!(err.is_cancellation());
        assert_eq!(
            err.cancellation_reason(),
            Some(CancellationReason::DiscardDeclined)
        );

        let backend = TransactionError::from(ModelError::request(500, "boom"));
        assert!(!backend.is_cancellation());
    }

    #[test]
    fn creation_failed_is_not_nested_twice() {
        let inner = TransactionError::creation_failed(ModelError::request(400, "bad").into());
        let outer = TransactionError::creation_failed(inner.clone());
        assert_eq!(inner, outer);
    }

    #[test]
    fn conflict_detection() {
        assert!(ModelError::request(409, "unsaved changes").is_conflict());
        assert!(!ModelError::request(412, "etag").is_conflict());
        assert!(!ModelError::Metadata("x".into()).is_conflict());
    }
}
