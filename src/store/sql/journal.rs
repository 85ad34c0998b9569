//! Journal operations.

use super::last_insert_rowid;
use crate::domain::{JournalEntry, NewJournalEntry, TaskId};
use crate::store::error::{StoreError, StoreResult};
use crate::store::models::{JournalRow, NewJournalRow};
use crate::store::schema::{task_journal, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

pub(crate) fn append(
    conn: &mut SqliteConnection,
    entry: &NewJournalEntry,
    now: DateTime<Utc>,
) -> StoreResult<JournalEntry> {
    let task_exists =
        diesel::select(diesel::dsl::exists(tasks::table.find(entry.task_id().get())))
            .get_result::<bool>(conn)?;
    if !task_exists {
        return Err(StoreError::TaskNotFound(entry.task_id()));
    }

    let row = NewJournalRow::from_domain(entry, now);
    diesel::insert_into(task_journal::table)
        .values(&row)
        .execute(conn)?;

    let id = diesel::select(last_insert_rowid()).get_result::<i64>(conn)?;
    task_journal::table
        .find(id)
        .select(JournalRow::as_select())
        .first::<JournalRow>(conn)?
        .into_domain()
}

pub(crate) fn list_for_task(
    conn: &mut SqliteConnection,
    task_id: TaskId,
) -> StoreResult<Vec<JournalEntry>> {
    task_journal::table
        .filter(task_journal::task_id.eq(task_id.get()))
        .order((task_journal::timestamp.asc(), task_journal::id.asc()))
        .select(JournalRow::as_select())
        .load::<JournalRow>(conn)?
        .into_iter()
        .map(JournalRow::into_domain)
        .collect()
}

pub(crate) fn clear_for_task(conn: &mut SqliteConnection, task_id: TaskId) -> StoreResult<()> {
    diesel::delete(task_journal::table.filter(task_journal::task_id.eq(task_id.get())))
        .execute(conn)?;
    Ok(())
}
