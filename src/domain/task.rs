//! Task snapshot, creation request, partial update, and checkout target.

use super::{DomainError, Priority, QueueName, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum length for a task title, matching the storage CHECK constraint.
pub const MAX_TITLE_LENGTH: usize = 500;

/// Immutable snapshot of a stored task.
///
/// `parameters` is an opaque JSON object document; the store imposes no
/// schema on it. Timestamps are written by the store, never by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Store-wide unique identifier.
    pub id: TaskId,
    /// Name of the owning queue.
    pub queue: QueueName,
    /// Short human-readable summary of the work.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Dispatch priority; higher is dispatched earlier.
    pub priority: Priority,
    /// Opaque parameter document, when present and well-formed.
    pub parameters: Option<Value>,
    /// Task-specific supplement to the queue instructions.
    pub instructions: Option<String>,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// Identifier of the current or last worker.
    pub worker_id: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Timestamp of the most recent checkout, if any.
    pub checked_out_at: Option<DateTime<Utc>>,
    /// Completion timestamp, if the task completed.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Validates a task title against the non-empty and length rules.
pub(crate) fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::EmptyTitle);
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(DomainError::TitleTooLong(title.len()));
    }
    Ok(())
}

/// Validates that a parameters document is a JSON object.
pub(crate) fn validate_parameters(parameters: &Value) -> Result<(), DomainError> {
    if parameters.is_object() {
        Ok(())
    } else {
        Err(DomainError::ParametersNotObject)
    }
}

/// Request payload for adding a task to a queue.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    queue: QueueName,
    title: String,
    description: Option<String>,
    priority: Priority,
    parameters: Option<Value>,
    instructions: Option<String>,
}

impl NewTask {
    /// Creates a request with the required queue and title.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyTitle`] when the title is empty after
    /// trimming or [`DomainError::TitleTooLong`] when it exceeds 500
    /// characters.
    pub fn new(queue: QueueName, title: impl Into<String>) -> Result<Self, DomainError> {
        let title = title.into();
        validate_title(&title)?;
        Ok(Self {
            queue,
            title,
            description: None,
            priority: Priority::DEFAULT,
            parameters: None,
            instructions: None,
        })
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the dispatch priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Attaches an opaque parameter document.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ParametersNotObject`] when the value is not
    /// a JSON object.
    pub fn with_parameters(mut self, parameters: Value) -> Result<Self, DomainError> {
        validate_parameters(&parameters)?;
        self.parameters = Some(parameters);
        Ok(self)
    }

    /// Sets task-specific instructions.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Returns the owning queue name.
    #[must_use]
    pub const fn queue(&self) -> &QueueName {
        &self.queue
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the dispatch priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the parameter document, if any.
    #[must_use]
    pub fn parameters(&self) -> Option<&Value> {
        self.parameters.as_ref()
    }

    /// Returns the instructions, if any.
    #[must_use]
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }
}

/// Partial update for a task.
///
/// An absent field (`None`) preserves the stored value. For the string
/// fields an empty string clears the stored value to `NULL`; for
/// `parameters`, `Value::Null` clears the stored document. Status,
/// worker assignment, and timestamps are never touched by a patch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    /// Replacement title; re-validated when present.
    pub title: Option<String>,
    /// Replacement description; empty clears.
    pub description: Option<String>,
    /// Replacement priority.
    pub priority: Option<Priority>,
    /// Replacement parameter document; `Value::Null` clears.
    pub parameters: Option<Value>,
    /// Replacement instructions; empty clears.
    pub instructions: Option<String>,
}

impl TaskPatch {
    /// Returns `true` when no field is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.parameters.is_none()
            && self.instructions.is_none()
    }
}

/// Target of a checkout operation.
///
/// Workers either ask a queue for its highest-priority pending task or
/// claim one specific task by id. Translating a raw string into one of
/// the two arms is the front ends' concern, not the store's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutTarget {
    /// Check out the best pending task of the named queue.
    Queue(QueueName),
    /// Check out one specific task.
    Task(TaskId),
}
