//! # todo-server
//!
//! Axum HTTP server for the task API.
//!
//! - **[`server`]**: `TodoServer`, router construction, listener startup
//! - **[`handlers`]**: One handler per route under `/api/tasks`
//! - **[`errors`]**: `ApiError`, the JSON error body every failure is rendered as
//! - **[`health`]**: `/health` response
//! - **[`config`]**: Bind address and CORS switch
//! - **[`shutdown`]**: `CancellationToken`-based graceful shutdown

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use errors::ApiError;
pub use server::{AppState, TodoServer};
pub use shutdown::ShutdownCoordinator;
