//! Diesel row models and row-to-domain conversions.

use super::error::{StoreError, StoreResult};
use super::schema::{queues, task_journal, tasks};
use crate::domain::{
    DomainError, EntryId, JournalEntry, NewJournalEntry, NewQueue, NewTask, Priority, Queue,
    QueueName, QueueUpdate, Task, TaskId, TaskPatch, TaskStatus,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for queue records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = queues)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct QueueRow {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) instructions: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl QueueRow {
    /// Reconstructs the domain snapshot.
    pub(crate) fn into_domain(self) -> StoreResult<Queue> {
        let name = QueueName::new(self.name).map_err(StoreError::invalid_row)?;
        Ok(Queue {
            name,
            description: self.description,
            instructions: self.instructions,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Insert model for queue records.
#[derive(Debug, Insertable)]
#[diesel(table_name = queues)]
pub(crate) struct NewQueueRow {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) instructions: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl NewQueueRow {
    pub(crate) fn from_domain(queue: &NewQueue, now: DateTime<Utc>) -> Self {
        Self {
            name: queue.name().as_str().to_owned(),
            description: queue.description().map(str::to_owned),
            instructions: queue.instructions().map(str::to_owned),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Changeset for queue partial updates. `None` skips the column,
/// `Some(None)` clears it to NULL.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = queues)]
pub(crate) struct QueueChangeset {
    pub(crate) description: Option<Option<String>>,
    pub(crate) instructions: Option<Option<String>>,
}

impl QueueChangeset {
    pub(crate) fn from_update(update: &QueueUpdate) -> Self {
        Self {
            description: update.description.as_deref().map(empty_clears),
            instructions: update.instructions.as_deref().map(empty_clears),
        }
    }
}

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct TaskRow {
    pub(crate) id: i64,
    pub(crate) queue_name: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) priority: i32,
    pub(crate) parameters: Option<String>,
    pub(crate) instructions: Option<String>,
    pub(crate) status: String,
    pub(crate) worker_id: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) checked_out_at: Option<DateTime<Utc>>,
    pub(crate) completed_at: Option<DateTime<Utc>>,
}

impl TaskRow {
    /// Reconstructs the domain snapshot.
    ///
    /// A malformed stored `parameters` document hydrates as `None`
    /// rather than failing the read.
    pub(crate) fn into_domain(self) -> StoreResult<Task> {
        let id = TaskId::new(self.id).map_err(StoreError::invalid_row)?;
        let queue = QueueName::new(self.queue_name).map_err(StoreError::invalid_row)?;
        let priority = Priority::new(self.priority).map_err(StoreError::invalid_row)?;
        let status = TaskStatus::try_from(self.status.as_str()).map_err(StoreError::invalid_row)?;
        let parameters = self
            .parameters
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok());

        Ok(Task {
            id,
            queue,
            title: self.title,
            description: self.description,
            priority,
            parameters,
            instructions: self.instructions,
            status,
            worker_id: self.worker_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            checked_out_at: self.checked_out_at,
            completed_at: self.completed_at,
        })
    }
}

/// Insert model for task records. Status, worker assignment, and the
/// checkout/completion stamps are owned by the state machine, so the
/// insert carries none of them beyond the initial `pending`.
#[derive(Debug, Insertable)]
#[diesel(table_name = tasks)]
pub(crate) struct NewTaskRow {
    pub(crate) queue_name: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) priority: i32,
    pub(crate) parameters: Option<String>,
    pub(crate) instructions: Option<String>,
    pub(crate) status: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl NewTaskRow {
    pub(crate) fn from_domain(task: &NewTask, now: DateTime<Utc>) -> Self {
        Self {
            queue_name: task.queue().as_str().to_owned(),
            title: task.title().to_owned(),
            description: task.description().map(str::to_owned),
            priority: task.priority().get(),
            parameters: task.parameters().map(Value::to_string),
            instructions: task.instructions().map(str::to_owned),
            status: TaskStatus::Pending.as_str().to_owned(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Changeset for task partial updates, with the same `None` skips /
/// `Some(None)` clears convention as [`QueueChangeset`].
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = tasks)]
pub(crate) struct TaskChangeset {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<Option<String>>,
    pub(crate) priority: Option<i32>,
    pub(crate) parameters: Option<Option<String>>,
    pub(crate) instructions: Option<Option<String>>,
}

impl TaskChangeset {
    /// Builds a changeset, re-validating every field present in the
    /// patch.
    pub(crate) fn from_patch(patch: &TaskPatch) -> Result<Self, DomainError> {
        if let Some(title) = patch.title.as_deref() {
            crate::domain::validate_title(title)?;
        }
        let parameters = match patch.parameters.as_ref() {
            None => None,
            Some(Value::Null) => Some(None),
            Some(value) => {
                crate::domain::validate_parameters(value)?;
                Some(Some(value.to_string()))
            }
        };

        Ok(Self {
            title: patch.title.clone(),
            description: patch.description.as_deref().map(empty_clears),
            priority: patch.priority.map(Priority::get),
            parameters,
            instructions: patch.instructions.as_deref().map(empty_clears),
        })
    }
}

/// Query result row for journal entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_journal)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct JournalRow {
    pub(crate) id: i64,
    pub(crate) task_id: i64,
    pub(crate) status: String,
    pub(crate) notes: Option<String>,
    pub(crate) timestamp: DateTime<Utc>,
}

impl JournalRow {
    /// Reconstructs the domain snapshot.
    pub(crate) fn into_domain(self) -> StoreResult<JournalEntry> {
        let id = EntryId::new(self.id).map_err(StoreError::invalid_row)?;
        let task_id = TaskId::new(self.task_id).map_err(StoreError::invalid_row)?;
        let status = TaskStatus::try_from(self.status.as_str()).map_err(StoreError::invalid_row)?;
        Ok(JournalEntry {
            id,
            task_id,
            status,
            notes: self.notes,
            timestamp: self.timestamp,
        })
    }
}

/// Insert model for journal entries.
#[derive(Debug, Insertable)]
#[diesel(table_name = task_journal)]
pub(crate) struct NewJournalRow {
    pub(crate) task_id: i64,
    pub(crate) status: String,
    pub(crate) notes: Option<String>,
    pub(crate) timestamp: DateTime<Utc>,
}

impl NewJournalRow {
    pub(crate) fn from_domain(entry: &NewJournalEntry, now: DateTime<Utc>) -> Self {
        Self {
            task_id: entry.task_id().get(),
            status: entry.status().as_str().to_owned(),
            notes: entry.notes().map(str::to_owned),
            timestamp: now,
        }
    }
}

/// Maps the partial-update convention for string fields: an empty string
/// clears the stored value to NULL.
fn empty_clears(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}
