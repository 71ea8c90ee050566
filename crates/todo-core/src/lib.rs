//! # todo-core
//!
//! Core types shared by every crate in the to-do backend.
//!
//! - [`entities`]: `Task` and `Comment` records plus the request inputs that
//!   create or mutate them
//! - [`ids`]: Branded UUID newtypes (`TaskId`, `CommentId`)
//! - [`time`]: The outward timestamp format (`MMM dd, yyyy HH:mm`, fixed zone)
//! - [`errors`]: The service error taxonomy (`InvalidArgument`, `NotFound`, `Internal`)
//! - [`logging`]: `tracing` subscriber setup

#![deny(unsafe_code)]

pub mod entities;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod time;

pub use entities::{Comment, CommentInput, Task, TaskInput, TaskQuery};
pub use errors::ServiceError;
pub use ids::{CommentId, TaskId};
