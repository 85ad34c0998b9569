//! Diesel schema for the task-queue store.

diesel::table! {
    /// Named task queues.
    queues (name) {
        /// Unique queue identifier.
        name -> Text,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Optional shared work contract for the queue's tasks.
        instructions -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> TimestamptzSqlite,
        /// Last update timestamp, touched by trigger.
        updated_at -> TimestamptzSqlite,
    }
}

diesel::table! {
    /// Units of work owned by a queue.
    tasks (id) {
        /// Store-wide unique identifier.
        id -> BigInt,
        /// Owning queue, cascade-deleted with it.
        queue_name -> Text,
        /// Short summary of the work.
        title -> Text,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Dispatch priority, 1 through 10.
        priority -> Integer,
        /// Opaque JSON parameter document.
        parameters -> Nullable<Text>,
        /// Task-specific instructions.
        instructions -> Nullable<Text>,
        /// Lifecycle status.
        status -> Text,
        /// Current or last worker.
        worker_id -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> TimestamptzSqlite,
        /// Last update timestamp, touched by trigger.
        updated_at -> TimestamptzSqlite,
        /// Most recent checkout timestamp.
        checked_out_at -> Nullable<TimestamptzSqlite>,
        /// Completion timestamp.
        completed_at -> Nullable<TimestamptzSqlite>,
    }
}

diesel::table! {
    /// Append-only status observations per task.
    task_journal (id) {
        /// Entry identifier.
        id -> BigInt,
        /// Task the observation belongs to, cascade-deleted with it.
        task_id -> BigInt,
        /// Observed status value.
        status -> Text,
        /// Optional free-text notes.
        notes -> Nullable<Text>,
        /// Time the observation was recorded.
        timestamp -> TimestamptzSqlite,
    }
}
