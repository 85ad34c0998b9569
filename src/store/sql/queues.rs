//! Queue operations.

use crate::domain::{NewQueue, Queue, QueueName, QueueStats, QueueUpdate, TaskStatus};
use crate::store::error::{StoreError, StoreResult};
use crate::store::models::{NewQueueRow, QueueChangeset, QueueRow};
use crate::store::schema::{queues, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;

pub(crate) fn create(
    conn: &mut SqliteConnection,
    queue: &NewQueue,
    now: DateTime<Utc>,
) -> StoreResult<Queue> {
    let row = NewQueueRow::from_domain(queue, now);
    diesel::insert_into(queues::table)
        .values(&row)
        .execute(conn)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                StoreError::QueueExists(queue.name().clone())
            }
            other => other.into(),
        })?;
    fetch_required(conn, queue.name())
}

pub(crate) fn fetch(conn: &mut SqliteConnection, name: &QueueName) -> StoreResult<Option<Queue>> {
    queues::table
        .find(name.as_str())
        .select(QueueRow::as_select())
        .first::<QueueRow>(conn)
        .optional()?
        .map(QueueRow::into_domain)
        .transpose()
}

pub(crate) fn fetch_required(conn: &mut SqliteConnection, name: &QueueName) -> StoreResult<Queue> {
    fetch(conn, name)?.ok_or_else(|| StoreError::QueueNotFound(name.clone()))
}

pub(crate) fn exists(conn: &mut SqliteConnection, name: &QueueName) -> StoreResult<bool> {
    let present = diesel::select(diesel::dsl::exists(queues::table.find(name.as_str())))
        .get_result::<bool>(conn)?;
    Ok(present)
}

pub(crate) fn list(conn: &mut SqliteConnection) -> StoreResult<Vec<Queue>> {
    queues::table
        .order(queues::name.asc())
        .select(QueueRow::as_select())
        .load::<QueueRow>(conn)?
        .into_iter()
        .map(QueueRow::into_domain)
        .collect()
}

pub(crate) fn update(
    conn: &mut SqliteConnection,
    name: &QueueName,
    update: &QueueUpdate,
) -> StoreResult<Queue> {
    // An all-absent update leaves the row untouched, by contract.
    if update.is_empty() {
        return fetch_required(conn, name);
    }

    let changeset = QueueChangeset::from_update(update);
    let affected = diesel::update(queues::table.find(name.as_str()))
        .set(&changeset)
        .execute(conn)?;
    if affected == 0 {
        return Err(StoreError::QueueNotFound(name.clone()));
    }
    fetch_required(conn, name)
}

pub(crate) fn delete(conn: &mut SqliteConnection, name: &QueueName) -> StoreResult<()> {
    let affected = diesel::delete(queues::table.find(name.as_str())).execute(conn)?;
    if affected == 0 {
        return Err(StoreError::QueueNotFound(name.clone()));
    }
    Ok(())
}

pub(crate) fn stats(conn: &mut SqliteConnection, name: &QueueName) -> StoreResult<QueueStats> {
    if !exists(conn, name)? {
        return Err(StoreError::QueueNotFound(name.clone()));
    }

    let counts: Vec<(String, i64)> = tasks::table
        .filter(tasks::queue_name.eq(name.as_str()))
        .group_by(tasks::status)
        .select((tasks::status, diesel::dsl::count_star()))
        .load(conn)?;

    let mut stats = QueueStats::default();
    for (status, count) in counts {
        let count = u64::try_from(count).unwrap_or(0);
        stats.total += count;
        match TaskStatus::try_from(status.as_str()).map_err(StoreError::invalid_row)? {
            TaskStatus::Pending => stats.pending = count,
            TaskStatus::CheckedOut => stats.checked_out = count,
            TaskStatus::Completed => stats.completed = count,
            TaskStatus::Failed => stats.failed = count,
        }
    }
    Ok(stats)
}
