//! Idempotent schema installation.
//!
//! The full DDL runs on every open; every statement is guarded with
//! `IF NOT EXISTS`, so opening an existing database is a no-op and an
//! older file is upgraded in place as long as this schema remains a
//! superset of what it contains.

use diesel::connection::SimpleConnection;
use diesel::sqlite::SqliteConnection;
use diesel::QueryResult;

/// Tables, constraints, dispatch-path indexes, and `updated_at` touch
/// triggers.
const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS queues (
    name TEXT PRIMARY KEY
        CHECK (length(name) > 0 AND length(name) <= 255),
    description TEXT,
    instructions TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    queue_name TEXT NOT NULL
        REFERENCES queues(name) ON DELETE CASCADE,
    title TEXT NOT NULL
        CHECK (length(title) > 0 AND length(title) <= 500),
    description TEXT,
    priority INTEGER NOT NULL DEFAULT 5
        CHECK (priority BETWEEN 1 AND 10),
    parameters TEXT,
    instructions TEXT,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'checked_out', 'completed', 'failed')),
    worker_id TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    checked_out_at TEXT,
    completed_at TEXT
);

CREATE TABLE IF NOT EXISTS task_journal (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id INTEGER NOT NULL
        REFERENCES tasks(id) ON DELETE CASCADE,
    status TEXT NOT NULL
        CHECK (status IN ('pending', 'checked_out', 'completed', 'failed')),
    notes TEXT,
    timestamp TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_tasks_queue_status ON tasks(queue_name, status);
CREATE INDEX IF NOT EXISTS idx_tasks_priority ON tasks(priority);
CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
CREATE INDEX IF NOT EXISTS idx_task_journal_task_id ON task_journal(task_id);
CREATE INDEX IF NOT EXISTS idx_task_journal_timestamp ON task_journal(timestamp);

CREATE TRIGGER IF NOT EXISTS trg_queues_touch_updated_at
AFTER UPDATE ON queues
FOR EACH ROW
BEGIN
    UPDATE queues SET updated_at = CURRENT_TIMESTAMP WHERE name = NEW.name;
END;

CREATE TRIGGER IF NOT EXISTS trg_tasks_touch_updated_at
AFTER UPDATE ON tasks
FOR EACH ROW
BEGIN
    UPDATE tasks SET updated_at = CURRENT_TIMESTAMP WHERE id = NEW.id;
END;
";

/// Installs the schema on the given connection.
pub(crate) fn install_schema(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(SCHEMA_SQL)
}
