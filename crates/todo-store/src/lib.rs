//! # todo-store
//!
//! `SQLite` persistence for tasks and their comments.
//!
//! - **[`connection`]**: `r2d2` connection pool with WAL mode, foreign keys and
//!   performance pragmas applied to every connection.
//! - **[`migrations`]**: Version-tracked schema, embedded at compile time and
//!   applied transactionally.
//! - **[`repositories`]**: Stateless `TaskRepo` / `CommentRepo`. Every method
//!   takes `&Connection`, so callers choose between a pooled connection and an
//!   open transaction.
//! - **[`row_types`]**: Raw row shapes and their conversion to entities.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod repositories;
pub mod row_types;

pub use connection::{
    ConnectionConfig, ConnectionPool, PooledConnection, PragmaState, new_file, new_in_memory,
    verify_pragmas,
};
pub use errors::{Result, StoreError};
pub use migrations::{current_version, latest_version, run_migrations};
pub use repositories::{CommentRepo, RECENT_TASK_LIMIT, TaskRepo};
