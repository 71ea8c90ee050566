//! # todo-service
//!
//! Business logic for tasks and comments.
//!
//! [`TaskService`] validates inputs, assigns server-owned fields (IDs,
//! timestamps), runs each write inside a single `SQLite` transaction and
//! translates store failures into [`todo_core::ServiceError`].

#![deny(unsafe_code)]

pub mod service;

pub use service::{COMMENT_REQUIRED, TASK_ID_REQUIRED, TASK_REQUIRED, TaskService};
