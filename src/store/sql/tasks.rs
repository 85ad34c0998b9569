//! Task operations, including the atomic-checkout path.

use super::last_insert_rowid;
use super::queues;
use crate::domain::{
    DomainError, NewTask, QueueName, Task, TaskId, TaskPatch, TaskStatus,
};
use crate::store::error::{StoreError, StoreResult};
use crate::store::models::{NewTaskRow, TaskChangeset, TaskRow};
use crate::store::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

pub(crate) fn add(
    conn: &mut SqliteConnection,
    task: &NewTask,
    now: DateTime<Utc>,
) -> StoreResult<Task> {
    if !queues::exists(conn, task.queue())? {
        return Err(StoreError::QueueNotFound(task.queue().clone()));
    }

    let row = NewTaskRow::from_domain(task, now);
    diesel::insert_into(tasks::table).values(&row).execute(conn)?;
    let id = assigned_id(conn)?;
    fetch_required(conn, id)
}

pub(crate) fn fetch(conn: &mut SqliteConnection, id: TaskId) -> StoreResult<Option<Task>> {
    tasks::table
        .find(id.get())
        .select(TaskRow::as_select())
        .first::<TaskRow>(conn)
        .optional()?
        .map(TaskRow::into_domain)
        .transpose()
}

pub(crate) fn fetch_required(conn: &mut SqliteConnection, id: TaskId) -> StoreResult<Task> {
    fetch(conn, id)?.ok_or(StoreError::TaskNotFound(id))
}

pub(crate) fn update(
    conn: &mut SqliteConnection,
    id: TaskId,
    patch: &TaskPatch,
) -> StoreResult<Task> {
    // An all-absent patch leaves the row untouched, by contract.
    if patch.is_empty() {
        return fetch_required(conn, id);
    }

    let changeset = TaskChangeset::from_patch(patch)?;
    let affected = diesel::update(tasks::table.find(id.get()))
        .set(&changeset)
        .execute(conn)?;
    if affected == 0 {
        return Err(StoreError::TaskNotFound(id));
    }
    fetch_required(conn, id)
}

pub(crate) fn checkout_by_queue(
    conn: &mut SqliteConnection,
    queue: &QueueName,
    worker_id: Option<&str>,
    now: DateTime<Utc>,
) -> StoreResult<Option<Task>> {
    if !queues::exists(conn, queue)? {
        return Err(StoreError::QueueNotFound(queue.clone()));
    }

    let candidate = tasks::table
        .filter(tasks::queue_name.eq(queue.as_str()))
        .filter(tasks::status.eq(TaskStatus::Pending.as_str()))
        .order((
            tasks::priority.desc(),
            tasks::created_at.asc(),
            tasks::id.asc(),
        ))
        .select(tasks::id)
        .first::<i64>(conn)
        .optional()?;

    let Some(raw_id) = candidate else {
        // An empty queue is a normal outcome, not a failure.
        return Ok(None);
    };
    let id = TaskId::new(raw_id).map_err(StoreError::invalid_row)?;

    claim_pending(conn, id, worker_id, now)?;
    fetch_required(conn, id).map(Some)
}

pub(crate) fn checkout_by_id(
    conn: &mut SqliteConnection,
    id: TaskId,
    worker_id: Option<&str>,
    now: DateTime<Utc>,
) -> StoreResult<Task> {
    let task = fetch_required(conn, id)?;
    if task.status != TaskStatus::Pending {
        return Err(StoreError::TaskUnavailable {
            id,
            status: task.status,
        });
    }

    claim_pending(conn, id, worker_id, now)?;
    fetch_required(conn, id)
}

/// Guarded flip from `pending` to `checked_out`.
///
/// The status condition in the WHERE clause is what makes checkout
/// atomic across writers: whichever transaction commits first wins,
/// and the loser's update affects zero rows.
fn claim_pending(
    conn: &mut SqliteConnection,
    id: TaskId,
    worker_id: Option<&str>,
    now: DateTime<Utc>,
) -> StoreResult<()> {
    let affected = diesel::update(
        tasks::table
            .filter(tasks::id.eq(id.get()))
            .filter(tasks::status.eq(TaskStatus::Pending.as_str())),
    )
    .set((
        tasks::status.eq(TaskStatus::CheckedOut.as_str()),
        tasks::worker_id.eq(worker_id),
        tasks::checked_out_at.eq(Some(now)),
    ))
    .execute(conn)?;

    if affected == 0 {
        return Err(StoreError::CheckoutContended(id));
    }
    Ok(())
}

pub(crate) fn complete(
    conn: &mut SqliteConnection,
    id: TaskId,
    now: DateTime<Utc>,
) -> StoreResult<Task> {
    let task = fetch_required(conn, id)?;
    match task.status {
        // Idempotent: no row update, so updated_at is not bumped.
        TaskStatus::Completed => Ok(task),
        TaskStatus::CheckedOut => {
            diesel::update(tasks::table.find(id.get()))
                .set((
                    tasks::status.eq(TaskStatus::Completed.as_str()),
                    tasks::completed_at.eq(Some(now)),
                ))
                .execute(conn)?;
            fetch_required(conn, id)
        }
        status => Err(StoreError::NotCheckedOut { id, status }),
    }
}

pub(crate) fn reset(conn: &mut SqliteConnection, id: TaskId) -> StoreResult<Task> {
    let task = fetch_required(conn, id)?;
    if task.status == TaskStatus::Pending {
        return Ok(task);
    }

    diesel::update(tasks::table.find(id.get()))
        .set((
            tasks::status.eq(TaskStatus::Pending.as_str()),
            tasks::worker_id.eq(None::<String>),
            tasks::checked_out_at.eq(None::<DateTime<Utc>>),
            tasks::completed_at.eq(None::<DateTime<Utc>>),
        ))
        .execute(conn)?;
    fetch_required(conn, id)
}

pub(crate) fn fail(conn: &mut SqliteConnection, id: TaskId) -> StoreResult<Task> {
    let task = fetch_required(conn, id)?;
    if task.status == TaskStatus::Failed {
        return Ok(task);
    }

    // worker_id and checked_out_at are left in place for forensics.
    diesel::update(tasks::table.find(id.get()))
        .set(tasks::status.eq(TaskStatus::Failed.as_str()))
        .execute(conn)?;
    fetch_required(conn, id)
}

pub(crate) fn delete(conn: &mut SqliteConnection, id: TaskId) -> StoreResult<()> {
    let affected = diesel::delete(tasks::table.find(id.get())).execute(conn)?;
    if affected == 0 {
        return Err(StoreError::TaskNotFound(id));
    }
    Ok(())
}

pub(crate) fn list(
    conn: &mut SqliteConnection,
    queue: &QueueName,
    status: Option<TaskStatus>,
    limit: Option<u32>,
) -> StoreResult<Vec<Task>> {
    if limit == Some(0) {
        return Err(DomainError::InvalidLimit.into());
    }

    let mut query = tasks::table
        .filter(tasks::queue_name.eq(queue.as_str()))
        .order((
            tasks::priority.desc(),
            tasks::created_at.asc(),
            tasks::id.asc(),
        ))
        .select(TaskRow::as_select())
        .into_boxed();

    if let Some(status) = status {
        query = query.filter(tasks::status.eq(status.as_str()));
    }
    if let Some(limit) = limit {
        query = query.limit(i64::from(limit));
    }

    query
        .load::<TaskRow>(conn)?
        .into_iter()
        .map(TaskRow::into_domain)
        .collect()
}

fn assigned_id(conn: &mut SqliteConnection) -> StoreResult<TaskId> {
    let id = diesel::select(last_insert_rowid()).get_result::<i64>(conn)?;
    TaskId::new(id).map_err(StoreError::invalid_row)
}
