//! Shared fixtures and helpers for the SQLite integration suite.

use camino::Utf8PathBuf;
use foreman::domain::{NewQueue, NewTask, Priority, QueueName, Task};
use foreman::store::TaskStore;
use rstest::fixture;
use tempfile::TempDir;

/// Keeps the backing temp directory alive alongside the open store.
pub struct StoreContext {
    pub store: TaskStore,
    dir: TempDir,
}

impl StoreContext {
    /// Path of the database file inside the temp directory.
    pub fn db_path(&self) -> Utf8PathBuf {
        db_path_in(&self.dir)
    }
}

fn db_path_in(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().join("foreman.db")).expect("temp dir paths are UTF-8")
}

/// Provides a fresh store over its own temporary database file.
#[fixture]
pub fn store_ctx() -> StoreContext {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = TaskStore::open(db_path_in(&dir)).expect("open store");
    StoreContext { store, dir }
}

/// Builds a validated queue name.
pub fn queue_name(name: &str) -> QueueName {
    QueueName::new(name).expect("valid queue name")
}

/// Creates an empty queue and returns its name.
pub fn create_queue(store: &TaskStore, name: &str) -> QueueName {
    let name = queue_name(name);
    store
        .create_queue(&NewQueue::new(name.clone()))
        .expect("create queue");
    name
}

/// Adds a pending task with the given title and priority.
pub fn seed_task(store: &TaskStore, queue: &QueueName, title: &str, priority: i32) -> Task {
    let task = NewTask::new(queue.clone(), title)
        .expect("valid title")
        .with_priority(Priority::new(priority).expect("valid priority"));
    store.add_task(&task).expect("add task")
}
