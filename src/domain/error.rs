//! Error types for domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// The queue name is empty after trimming.
    #[error("queue name must not be empty")]
    EmptyQueueName,

    /// The queue name exceeds the 255-character limit.
    #[error("queue name '{0}' exceeds 255 characters")]
    QueueNameTooLong(String),

    /// The queue name contains characters outside `[A-Za-z0-9._-]`.
    #[error("invalid queue name '{0}', expected letters, digits, '-', '_', or '.'")]
    InvalidQueueName(String),

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the 500-character limit.
    #[error("task title of {0} characters exceeds the 500-character limit")]
    TitleTooLong(usize),

    /// The priority is outside the accepted range.
    #[error("priority {0} is out of range, expected 1 through 10")]
    PriorityOutOfRange(i32),

    /// The task identifier is zero or negative.
    #[error("invalid task id {0}, expected a positive integer")]
    NonPositiveTaskId(i64),

    /// The journal entry identifier is zero or negative.
    #[error("invalid journal entry id {0}, expected a positive integer")]
    NonPositiveEntryId(i64),

    /// The task parameters document is not a JSON object.
    #[error("task parameters must be a JSON object")]
    ParametersNotObject,

    /// The listing limit is zero.
    #[error("limit must be a positive integer")]
    InvalidLimit,

    /// A status string does not name one of the four task states.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),
}

/// Error returned while parsing task statuses from external input or
/// persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
