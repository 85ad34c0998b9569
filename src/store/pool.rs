//! SQLite connection pooling with per-connection pragma setup.

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError};
use diesel::sqlite::SqliteConnection;

/// Connection pool over the task-queue database file.
pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

const DEFAULT_POOL_SIZE: u32 = 8;

/// Applied to every connection the pool hands out. WAL keeps a
/// single-writer/many-reader discipline across processes, and the busy
/// timeout makes contending writers wait instead of failing immediately.
const CONNECTION_PRAGMAS: &str = "
    PRAGMA foreign_keys = ON;
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = NORMAL;
    PRAGMA busy_timeout = 5000;
";

#[derive(Debug, Clone, Copy)]
struct PragmaCustomizer;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(CONNECTION_PRAGMAS)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the pool for the database at `database_url`.
pub(crate) fn build_pool(database_url: &str) -> Result<SqlitePool, PoolError> {
    Pool::builder()
        .max_size(DEFAULT_POOL_SIZE)
        .connection_customizer(Box::new(PragmaCustomizer))
        .build(ConnectionManager::new(database_url))
}
