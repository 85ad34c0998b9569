//! Failure taxonomy for store operations.

use crate::domain::{DomainError, QueueName, TaskId, TaskStatus};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store operations.
///
/// Variants group into five kinds (see [`StoreError::kind`]): validation,
/// not-found, conflict, checkout, and database. Typed failures surface
/// unchanged to the caller; the store never retries silently.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Input violated a documented constraint.
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// The referenced queue does not exist.
    #[error("queue not found: {0}")]
    QueueNotFound(QueueName),

    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A queue with the same name already exists.
    #[error("queue already exists: {0}")]
    QueueExists(QueueName),

    /// The task is not in the `pending` state, so it cannot be checked
    /// out.
    #[error("task {id} cannot be checked out, status is {status}")]
    TaskUnavailable {
        /// The requested task.
        id: TaskId,
        /// Its current status.
        status: TaskStatus,
    },

    /// Another worker claimed the task between selection and the guarded
    /// update. The transaction rolled back; the caller may retry.
    #[error("task {0} was claimed by another worker")]
    CheckoutContended(TaskId),

    /// The task is not currently checked out, so it cannot be completed.
    #[error("task {id} is not checked out, status is {status}")]
    NotCheckedOut {
        /// The requested task.
        id: TaskId,
        /// Its current status.
        status: TaskStatus,
    },

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted row: {0}")]
    InvalidPersistedRow(Arc<dyn std::error::Error + Send + Sync>),

    /// A lower-level storage fault (I/O error, lock timeout, corrupt
    /// file), carrying the underlying cause.
    #[error("database error: {0}")]
    Database(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a data-quality error from persisted rows.
    pub fn invalid_row(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedRow(Arc::new(err))
    }

    /// Wraps an underlying storage fault.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Database(Arc::new(err))
    }

    /// Returns the failure kind this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::NotCheckedOut { .. } => ErrorKind::Validation,
            Self::QueueNotFound(_) | Self::TaskNotFound(_) => ErrorKind::NotFound,
            Self::QueueExists(_) => ErrorKind::Conflict,
            Self::TaskUnavailable { .. } | Self::CheckoutContended(_) => ErrorKind::Checkout,
            Self::InvalidPersistedRow(_) | Self::Database(_) => ErrorKind::Database,
        }
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(Arc::new(err))
    }
}

impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Self::Database(Arc::new(err))
    }
}

/// The five failure kinds exposed to front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input violated a documented constraint.
    Validation,
    /// The referenced queue or task does not exist.
    NotFound,
    /// A uniqueness conflict, such as a duplicate queue name.
    Conflict,
    /// A checkout race was lost or the task was not pending.
    Checkout,
    /// A lower-level storage fault.
    Database,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Checkout => "checkout",
            Self::Database => "database",
        };
        f.write_str(label)
    }
}
