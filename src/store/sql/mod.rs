//! SQL-level primitives over a live connection.
//!
//! Every function here takes `&mut SqliteConnection` and leaves
//! transaction scoping to the caller, so the store can compose several
//! primitives inside one write bracket and nested operation calls run
//! inside the outer scope.

pub(crate) mod journal;
pub(crate) mod queues;
pub(crate) mod tasks;

use diesel::sql_types::BigInt;

diesel::define_sql_function! {
    /// Rowid of the most recent successful insert on this connection.
    fn last_insert_rowid() -> BigInt;
}
