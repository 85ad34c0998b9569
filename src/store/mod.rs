//! SQLite-backed task store.
//!
//! [`TaskStore`] is the long-lived handle over one database file. It is
//! cheap to clone and safe to share across threads; several processes
//! may open the same file concurrently. Mutating operations run inside
//! `BEGIN IMMEDIATE` write transactions, so SQLite's single-writer
//! discipline plus the guarded checkout update keep every pending task
//! assigned to at most one worker.
//!
//! Callers who need a compound action to commit or roll back as one
//! unit bracket it with [`TaskStore::transaction`]; the closure receives
//! a [`StoreTransaction`] exposing the same operations bound to the
//! transaction's connection.

mod error;
mod migrations;
mod models;
mod pool;
mod schema;
mod sql;


pub use error::{ErrorKind, StoreError, StoreResult};
pub use pool::SqlitePool;

use crate::domain::{
    CheckoutTarget, JournalEntry, NewJournalEntry, NewQueue, NewTask, Queue, QueueName,
    QueueStats, QueueUpdate, Task, TaskId, TaskPatch, TaskStatus,
};
use camino::Utf8Path;
use diesel::connection::Connection;
use diesel::sqlite::SqliteConnection;
use mockable::{Clock, DefaultClock};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Handle over the task-queue database.
#[derive(Clone)]
pub struct TaskStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskStore").finish_non_exhaustive()
    }
}

impl TaskStore {
    /// Opens or creates the database at `path`, creating parent
    /// directories as needed and installing the schema idempotently.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] when the file cannot be created
    /// or opened, or when schema installation fails.
    pub fn open(path: impl AsRef<Utf8Path>) -> StoreResult<Self> {
        Self::open_with_clock(path, Arc::new(DefaultClock))
    }

    /// Opens the database with an injected clock, so tests can control
    /// the timestamps the store writes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] when the file cannot be created
    /// or opened, or when schema installation fails.
    pub fn open_with_clock(
        path: impl AsRef<Utf8Path>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StoreError::database)?;
            }
        }

        let pool = pool::build_pool(path.as_str())?;
        let mut conn = pool.get()?;
        migrations::install_schema(&mut conn)?;
        drop(conn);

        debug!(database = %path, "opened task store");
        Ok(Self { pool, clock })
    }

    /// Closes the store, dropping its connection pool.
    ///
    /// Clones of this handle keep their own pool reference; the file is
    /// released once the last clone is gone.
    pub fn close(self) {
        drop(self.pool);
    }

    /// Runs `f` inside one serializable write transaction.
    ///
    /// The closure receives a [`StoreTransaction`] whose operations all
    /// run on the transaction's connection. An `Err` propagated out of
    /// `f` rolls the whole bracket back.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or [`StoreError::Database`] when
    /// the transaction itself cannot be started or committed.
    pub fn transaction<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut StoreTransaction<'_>) -> StoreResult<T>,
    {
        let clock: &(dyn Clock + Send + Sync) = self.clock.as_ref();
        let mut conn = self.pool.get()?;
        conn.immediate_transaction(|conn| {
            let mut tx = StoreTransaction { conn, clock };
            f(&mut tx)
        })
    }

    /// Creates a queue.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::QueueExists`] when the name is taken.
    #[instrument(skip(self), level = "debug")]
    pub fn create_queue(&self, queue: &NewQueue) -> StoreResult<Queue> {
        let now = self.clock.utc();
        self.write(|conn| sql::queues::create(conn, queue, now))
    }

    /// Applies a partial update to a queue and returns the new snapshot.
    ///
    /// Absent fields preserve stored values; empty strings clear them to
    /// `NULL`. An all-absent update returns the current snapshot without
    /// touching the row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::QueueNotFound`] when the queue is missing.
    #[instrument(skip(self), level = "debug")]
    pub fn update_queue(&self, name: &QueueName, update: &QueueUpdate) -> StoreResult<Queue> {
        self.write(|conn| sql::queues::update(conn, name, update))
    }

    /// Deletes a queue, cascading to its tasks and their journals.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::QueueNotFound`] when the queue is missing.
    #[instrument(skip(self), level = "debug")]
    pub fn delete_queue(&self, name: &QueueName) -> StoreResult<()> {
        self.write(|conn| sql::queues::delete(conn, name))
    }

    /// Looks up a queue by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on storage faults; a missing
    /// queue is `Ok(None)`.
    pub fn get_queue(&self, name: &QueueName) -> StoreResult<Option<Queue>> {
        self.read(|conn| sql::queues::fetch(conn, name))
    }

    /// Lists every queue, ascending by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on storage faults.
    pub fn list_queues(&self) -> StoreResult<Vec<Queue>> {
        self.read(sql::queues::list)
    }

    /// Returns task counts for a queue, grouped by status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::QueueNotFound`] when the queue is missing.
    pub fn get_queue_stats(&self, name: &QueueName) -> StoreResult<QueueStats> {
        self.read_tx(|conn| sql::queues::stats(conn, name))
    }

    /// Adds a pending task to a queue.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::QueueNotFound`] when the queue is missing.
    #[instrument(skip(self), level = "debug")]
    pub fn add_task(&self, task: &NewTask) -> StoreResult<Task> {
        let now = self.clock.utc();
        self.write(|conn| sql::tasks::add(conn, task, now))
    }

    /// Applies a partial update to a task and returns the new snapshot.
    ///
    /// Fields present in the patch are re-validated. Status, worker
    /// assignment, and timestamps are never changed by a patch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] when the task is missing, or
    /// [`StoreError::Validation`] when a present field is invalid.
    #[instrument(skip(self), level = "debug")]
    pub fn update_task(&self, id: TaskId, patch: &TaskPatch) -> StoreResult<Task> {
        self.write(|conn| sql::tasks::update(conn, id, patch))
    }

    /// Checks out a task for a worker.
    ///
    /// For [`CheckoutTarget::Queue`], the single pending task with the
    /// highest priority (earliest creation on ties) flips to
    /// `checked_out`; `Ok(None)` means the queue has nothing pending and
    /// is a normal outcome. For [`CheckoutTarget::Task`], the named task
    /// must be pending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::QueueNotFound`] or
    /// [`StoreError::TaskNotFound`] for an unknown target,
    /// [`StoreError::TaskUnavailable`] when a directly addressed task is
    /// not pending, and [`StoreError::CheckoutContended`] when another
    /// worker wins the race; after a contended failure the transaction
    /// has rolled back and the caller may retry.
    #[instrument(skip(self), level = "debug")]
    pub fn checkout_task(
        &self,
        target: &CheckoutTarget,
        worker_id: Option<&str>,
    ) -> StoreResult<Option<Task>> {
        let now = self.clock.utc();
        let checked_out = self.write(|conn| match target {
            CheckoutTarget::Queue(name) => sql::tasks::checkout_by_queue(conn, name, worker_id, now),
            CheckoutTarget::Task(id) => {
                sql::tasks::checkout_by_id(conn, *id, worker_id, now).map(Some)
            }
        })?;

        match checked_out.as_ref() {
            Some(task) => debug!(task = %task.id, worker = ?worker_id, "checked out task"),
            None => trace!("no pending task available"),
        }
        Ok(checked_out)
    }

    /// Marks a checked-out task as completed, stamping `completed_at`.
    ///
    /// Idempotent for already-completed tasks: the current snapshot is
    /// returned and the row is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] when the task is missing, or
    /// [`StoreError::NotCheckedOut`] when it is pending or failed.
    #[instrument(skip(self), level = "debug")]
    pub fn complete_task(&self, id: TaskId) -> StoreResult<Task> {
        let now = self.clock.utc();
        self.write(|conn| sql::tasks::complete(conn, id, now))
    }

    /// Restores a task to `pending` from any state, clearing the worker
    /// assignment and the checkout/completion stamps.
    ///
    /// This is the recovery path for stranded tasks: any caller may
    /// reset any task. Idempotent for already-pending tasks.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] when the task is missing.
    #[instrument(skip(self), level = "debug")]
    pub fn reset_task(&self, id: TaskId) -> StoreResult<Task> {
        self.write(|conn| sql::tasks::reset(conn, id))
    }

    /// Marks a task as failed from any state, leaving `worker_id` and
    /// `checked_out_at` in place for forensics. Idempotent for
    /// already-failed tasks.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] when the task is missing.
    #[instrument(skip(self), level = "debug")]
    pub fn fail_task(&self, id: TaskId) -> StoreResult<Task> {
        self.write(|conn| sql::tasks::fail(conn, id))
    }

    /// Deletes a task, cascading to its journal entries.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] when the task is missing.
    #[instrument(skip(self), level = "debug")]
    pub fn delete_task(&self, id: TaskId) -> StoreResult<()> {
        self.write(|conn| sql::tasks::delete(conn, id))
    }

    /// Looks up a task by id.
    ///
    /// A stored `parameters` document that is not well-formed JSON
    /// hydrates as `None`; the read itself succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on storage faults; a missing
    /// task is `Ok(None)`.
    pub fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        self.read(|conn| sql::tasks::fetch(conn, id))
    }

    /// Lists a queue's tasks in dispatch order (`priority` descending,
    /// creation ascending), optionally filtered by status and capped at
    /// `limit` entries.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] when `limit` is zero.
    pub fn list_tasks(
        &self,
        queue: &QueueName,
        status: Option<TaskStatus>,
        limit: Option<u32>,
    ) -> StoreResult<Vec<Task>> {
        self.read(|conn| sql::tasks::list(conn, queue, status, limit))
    }

    /// Appends a status observation to a task's journal.
    ///
    /// The recorded status is validated as one of the four task states
    /// but deliberately not checked against the task's current status;
    /// entries are observations, not transitions.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] when the task is missing.
    #[instrument(skip(self), level = "debug")]
    pub fn add_journal_entry(&self, entry: &NewJournalEntry) -> StoreResult<JournalEntry> {
        let now = self.clock.utc();
        self.write(|conn| sql::journal::append(conn, entry, now))
    }

    /// Returns a task's journal in ascending timestamp order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on storage faults; a task with
    /// no entries yields an empty list.
    pub fn get_task_journal(&self, task_id: TaskId) -> StoreResult<Vec<JournalEntry>> {
        self.read(|conn| sql::journal::list_for_task(conn, task_id))
    }

    /// Deletes every journal entry for a task; a no-op when none exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on storage faults.
    #[instrument(skip(self), level = "debug")]
    pub fn clear_task_journal(&self, task_id: TaskId) -> StoreResult<()> {
        self.write(|conn| sql::journal::clear_for_task(conn, task_id))
    }

    fn write<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut SqliteConnection) -> StoreResult<T>,
    {
        let mut conn = self.pool.get()?;
        conn.immediate_transaction(f)
    }

    fn read<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut SqliteConnection) -> StoreResult<T>,
    {
        let mut conn = self.pool.get()?;
        f(&mut conn)
    }

    fn read_tx<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut SqliteConnection) -> StoreResult<T>,
    {
        let mut conn = self.pool.get()?;
        conn.transaction(|c| f(c))
    }
}

/// Operations bound to one open write transaction.
///
/// Produced by [`TaskStore::transaction`]. Every call here runs on the
/// bracket's connection, so nested operations commit or roll back with
/// the bracket as a whole.
pub struct StoreTransaction<'a> {
    conn: &'a mut SqliteConnection,
    clock: &'a (dyn Clock + Send + Sync),
}

impl fmt::Debug for StoreTransaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreTransaction").finish_non_exhaustive()
    }
}

impl StoreTransaction<'_> {
    /// See [`TaskStore::create_queue`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::create_queue`].
    pub fn create_queue(&mut self, queue: &NewQueue) -> StoreResult<Queue> {
        let now = self.clock.utc();
        sql::queues::create(self.conn, queue, now)
    }

    /// See [`TaskStore::update_queue`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::update_queue`].
    pub fn update_queue(&mut self, name: &QueueName, update: &QueueUpdate) -> StoreResult<Queue> {
        sql::queues::update(self.conn, name, update)
    }

    /// See [`TaskStore::delete_queue`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::delete_queue`].
    pub fn delete_queue(&mut self, name: &QueueName) -> StoreResult<()> {
        sql::queues::delete(self.conn, name)
    }

    /// See [`TaskStore::get_queue`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::get_queue`].
    pub fn get_queue(&mut self, name: &QueueName) -> StoreResult<Option<Queue>> {
        sql::queues::fetch(self.conn, name)
    }

    /// See [`TaskStore::list_queues`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::list_queues`].
    pub fn list_queues(&mut self) -> StoreResult<Vec<Queue>> {
        sql::queues::list(self.conn)
    }

    /// See [`TaskStore::get_queue_stats`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::get_queue_stats`].
    pub fn get_queue_stats(&mut self, name: &QueueName) -> StoreResult<QueueStats> {
        sql::queues::stats(self.conn, name)
    }

    /// See [`TaskStore::add_task`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::add_task`].
    pub fn add_task(&mut self, task: &NewTask) -> StoreResult<Task> {
        let now = self.clock.utc();
        sql::tasks::add(self.conn, task, now)
    }

    /// See [`TaskStore::update_task`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::update_task`].
    pub fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> StoreResult<Task> {
        sql::tasks::update(self.conn, id, patch)
    }

    /// See [`TaskStore::checkout_task`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::checkout_task`].
    pub fn checkout_task(
        &mut self,
        target: &CheckoutTarget,
        worker_id: Option<&str>,
    ) -> StoreResult<Option<Task>> {
        let now = self.clock.utc();
        match target {
            CheckoutTarget::Queue(name) => {
                sql::tasks::checkout_by_queue(self.conn, name, worker_id, now)
            }
            CheckoutTarget::Task(id) => {
                sql::tasks::checkout_by_id(self.conn, *id, worker_id, now).map(Some)
            }
        }
    }

    /// See [`TaskStore::complete_task`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::complete_task`].
    pub fn complete_task(&mut self, id: TaskId) -> StoreResult<Task> {
        let now = self.clock.utc();
        sql::tasks::complete(self.conn, id, now)
    }

    /// See [`TaskStore::reset_task`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::reset_task`].
    pub fn reset_task(&mut self, id: TaskId) -> StoreResult<Task> {
        sql::tasks::reset(self.conn, id)
    }

    /// See [`TaskStore::fail_task`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::fail_task`].
    pub fn fail_task(&mut self, id: TaskId) -> StoreResult<Task> {
        sql::tasks::fail(self.conn, id)
    }

    /// See [`TaskStore::delete_task`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::delete_task`].
    pub fn delete_task(&mut self, id: TaskId) -> StoreResult<()> {
        sql::tasks::delete(self.conn, id)
    }

    /// See [`TaskStore::get_task`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::get_task`].
    pub fn get_task(&mut self, id: TaskId) -> StoreResult<Option<Task>> {
        sql::tasks::fetch(self.conn, id)
    }

    /// See [`TaskStore::list_tasks`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::list_tasks`].
    pub fn list_tasks(
        &mut self,
        queue: &QueueName,
        status: Option<TaskStatus>,
        limit: Option<u32>,
    ) -> StoreResult<Vec<Task>> {
        sql::tasks::list(self.conn, queue, status, limit)
    }

    /// See [`TaskStore::add_journal_entry`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::add_journal_entry`].
    pub fn add_journal_entry(&mut self, entry: &NewJournalEntry) -> StoreResult<JournalEntry> {
        let now = self.clock.utc();
        sql::journal::append(self.conn, entry, now)
    }

    /// See [`TaskStore::get_task_journal`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::get_task_journal`].
    pub fn get_task_journal(&mut self, task_id: TaskId) -> StoreResult<Vec<JournalEntry>> {
        sql::journal::list_for_task(self.conn, task_id)
    }

    /// See [`TaskStore::clear_task_journal`].
    ///
    /// # Errors
    ///
    /// As [`TaskStore::clear_task_journal`].
    pub fn clear_task_journal(&mut self, task_id: TaskId) -> StoreResult<()> {
        sql::journal::clear_for_task(self.conn, task_id)
    }
}
