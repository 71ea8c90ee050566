//! Repository implementations.
//!
//! Each repository is a stateless struct whose methods take a `&Connection`.
//! Passing an open transaction makes a sequence of repository calls atomic.

pub mod comment;
pub mod task;

pub use comment::CommentRepo;
pub use task::{RECENT_TASK_LIMIT, TaskRepo};
