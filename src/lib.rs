//! Foreman: durable task-queue coordination for parallel workers.
//!
//! This crate provides a concurrency-safe store of named queues holding
//! prioritized, parameterized tasks over a single embedded SQLite file.
//! Many workers, across threads and OS processes, can share one database;
//! the store guarantees that each pending task is checked out by at most
//! one worker at a time.
//!
//! # Architecture
//!
//! Foreman keeps infrastructure out of the domain layer:
//!
//! - **Domain**: validated value types, entity snapshots, and the task
//!   state machine, with no storage imports
//! - **Store**: the SQLite adapter (schema, row models, SQL primitives)
//!   and the [`store::TaskStore`] handle exposing every operation
//!
//! # Modules
//!
//! - [`domain`]: queue, task, and journal types plus validation errors
//! - [`store`]: the persistent store and its failure taxonomy

pub mod domain;
pub mod store;
