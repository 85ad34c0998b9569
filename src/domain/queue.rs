//! Queue snapshot, creation request, partial update, and statistics.

use super::QueueName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a stored queue.
///
/// Timestamps are written by the store; callers never supply them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    /// Unique queue identifier.
    pub name: QueueName,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional work contract shared by all tasks in the queue.
    pub instructions: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQueue {
    name: QueueName,
    description: Option<String>,
    instructions: Option<String>,
}

impl NewQueue {
    /// Creates a request for a queue with the given name.
    #[must_use]
    pub const fn new(name: QueueName) -> Self {
        Self {
            name,
            description: None,
            instructions: None,
        }
    }

    /// Sets the queue description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the shared work instructions.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Returns the queue name.
    #[must_use]
    pub const fn name(&self) -> &QueueName {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the instructions, if any.
    #[must_use]
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }
}

/// Partial update for a queue.
///
/// An absent field (`None`) preserves the stored value; an empty string
/// clears it to `NULL`. An update with every field absent leaves the row
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueUpdate {
    /// Replacement description; empty clears.
    pub description: Option<String>,
    /// Replacement instructions; empty clears.
    pub instructions: Option<String>,
}

impl QueueUpdate {
    /// Returns `true` when no field is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.description.is_none() && self.instructions.is_none()
    }
}

/// Snapshot of task counts for one queue, grouped by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Number of tasks currently owned by the queue.
    pub total: u64,
    /// Tasks waiting to be dispatched.
    pub pending: u64,
    /// Tasks currently claimed by a worker.
    pub checked_out: u64,
    /// Tasks that finished successfully.
    pub completed: u64,
    /// Tasks marked as failed.
    pub failed: u64,
}
