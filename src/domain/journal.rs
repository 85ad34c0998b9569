//! Append-only journal of status observations for a task.

use super::{EntryId, TaskId, TaskStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a stored journal entry.
///
/// Entries are caller-driven observations, not transitions: the recorded
/// status is validated as one of the four task states but deliberately
/// not checked against the task's current status, so back-dated
/// observations can be journaled after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Entry identifier.
    pub id: EntryId,
    /// Task the observation belongs to.
    pub task_id: TaskId,
    /// Observed status.
    pub status: TaskStatus,
    /// Optional free-text notes.
    pub notes: Option<String>,
    /// Time the observation was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Request payload for appending a journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJournalEntry {
    task_id: TaskId,
    status: TaskStatus,
    notes: Option<String>,
}

impl NewJournalEntry {
    /// Creates an observation of `status` for the given task.
    #[must_use]
    pub const fn new(task_id: TaskId, status: TaskStatus) -> Self {
        Self {
            task_id,
            status,
            notes: None,
        }
    }

    /// Attaches free-text notes to the observation.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Returns the task the observation belongs to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the observed status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}
