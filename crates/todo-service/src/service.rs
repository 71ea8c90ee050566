//! Task service with validation and error mapping.
//!
//! Rules enforced here rather than in the store:
//!
//! - **Required inputs**: a missing ID or payload is rejected as
//!   `InvalidArgument` before a connection is checked out.
//! - **Server-owned fields**: IDs and `created_at` are never taken from a
//!   request. `updated_at` moves on create and update only.
//! - **Atomic writes**: every mutating operation runs in one transaction, so
//!   adding a comment cannot leave the comment stored without its task update.
//! - **Error boundary**: store failures become `Internal` with an operation
//!   message and the original error as source. A delete that matches no row
//!   becomes `NotFound`.

use rusqlite::Connection;
use todo_core::time::now;
use todo_core::{Comment, CommentInput, ServiceError, Task, TaskId, TaskInput, TaskQuery};
use todo_store::{
    CommentRepo, ConnectionPool, PooledConnection, RECENT_TASK_LIMIT, StoreError, TaskRepo,
};
use tracing::{debug, error, info, warn};

/// Rejection message for a missing task payload.
pub const TASK_REQUIRED: &str = "Task must not be null";
/// Rejection message for a missing task ID.
pub const TASK_ID_REQUIRED: &str = "Task ID must not be null.";
/// Rejection message for a missing comment payload.
pub const COMMENT_REQUIRED: &str = "Comment must not be null";

/// Task service. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct TaskService {
    pool: ConnectionPool,
}

impl TaskService {
    /// Create a service over an already-migrated pool.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Task operations
    // ─────────────────────────────────────────────────────────────────────

    /// Create a task from client input with a fresh ID and timestamps.
    pub fn create_task(&self, task: Option<TaskInput>) -> Result<Task, ServiceError> {
        let input = require(task, TASK_REQUIRED)?;
        let task = Task::create(input, now());
        info!(task_id = %task.id, "creating task");

        self.write(|conn| TaskRepo::save(conn, &task))
            .map_err(internal("Failed to create task", Some(task.id)))
    }

    /// Overwrite the editable fields of an existing task.
    pub fn update_task(
        &self,
        id: Option<TaskId>,
        updated: Option<TaskInput>,
    ) -> Result<Task, ServiceError> {
        let id = require(id, TASK_ID_REQUIRED)?;
        let input = require(updated, TASK_REQUIRED)?;
        info!(task_id = %id, "updating task");

        let task = self
            .write(|conn| {
                let Some(mut task) = TaskRepo::find_by_id(conn, &id)? else {
                    return Ok(None);
                };
                task.apply_update(input, now());
                TaskRepo::save(conn, &task).map(Some)
            })
            .map_err(internal("Failed to update task", Some(id)))?;
        task.ok_or_else(|| not_found(id))
    }

    /// Set the completion flag. `updated_at` is left as it was.
    pub fn toggle_completion(
        &self,
        id: Option<TaskId>,
        completed: bool,
    ) -> Result<Task, ServiceError> {
        let id = require(id, TASK_ID_REQUIRED)?;
        info!(task_id = %id, completed, "toggling task completion");

        let task = self
            .write(|conn| {
                let Some(mut task) = TaskRepo::find_by_id(conn, &id)? else {
                    return Ok(None);
                };
                task.completed = completed;
                TaskRepo::save(conn, &task).map(Some)
            })
            .map_err(internal("Failed to toggle task completion", Some(id)))?;
        task.ok_or_else(|| not_found(id))
    }

    /// Delete a task and its comments.
    pub fn delete_task(&self, id: Option<TaskId>) -> Result<(), ServiceError> {
        let id = require(id, TASK_ID_REQUIRED)?;
        info!(task_id = %id, "deleting task");

        self.write(|conn| TaskRepo::delete_by_id(conn, &id))
            .map_err(|e| match e {
                StoreError::RowNotFound { .. } => not_found(id),
                other => internal("Failed to delete task", Some(id))(other),
            })
    }

    /// Fetch one task with its comments.
    pub fn get_task_by_id(&self, id: Option<TaskId>) -> Result<Task, ServiceError> {
        let id = require(id, TASK_ID_REQUIRED)?;
        info!(task_id = %id, "fetching task");

        let task = self
            .read(|conn| TaskRepo::find_by_id(conn, &id))
            .map_err(internal("Failed to fetch task", Some(id)))?;
        task.ok_or_else(|| not_found(id))
    }

    /// The most recently created tasks, newest first.
    ///
    /// Filters in `query` are accepted but not applied yet.
    pub fn get_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, ServiceError> {
        info!("fetching recent tasks");
        if !query.is_empty() {
            debug!(?query, "task filters are not applied to the recent listing");
        }

        self.read(|conn| TaskRepo::find_recent(conn, RECENT_TASK_LIMIT))
            .map_err(internal("Failed to fetch tasks", None))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Comment operations
    // ─────────────────────────────────────────────────────────────────────

    /// Append a comment to a task. Returns the task with the new comment last.
    pub fn add_comment(
        &self,
        task_id: Option<TaskId>,
        comment: Option<CommentInput>,
    ) -> Result<Task, ServiceError> {
        let id = require(task_id, TASK_ID_REQUIRED)?;
        let input = require(comment, COMMENT_REQUIRED)?;
        info!(task_id = %id, "adding comment");

        let task = self
            .write(|conn| {
                let Some(mut task) = TaskRepo::find_by_id(conn, &id)? else {
                    return Ok(None);
                };
                let comment = CommentRepo::save(conn, &Comment::create(id, input, now()))?;
                task.comments.push(comment);
                TaskRepo::save(conn, &task).map(Some)
            })
            .map_err(internal("Failed to add comment", Some(id)))?;
        task.ok_or_else(|| not_found(id))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────

    fn conn(&self) -> Result<PooledConnection, StoreError> {
        Ok(self.pool.get()?)
    }

    fn read<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.conn()?;
        op(&*conn)
    }

    /// Run `op` inside a transaction. Any error rolls the whole thing back.
    fn write<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        let out = op(&*tx)?;
        tx.commit()?;
        Ok(out)
    }
}

fn require<T>(value: Option<T>, message: &'static str) -> Result<T, ServiceError> {
    value.ok_or_else(|| {
        warn!(reason = message, "rejected request");
        ServiceError::invalid_argument(message)
    })
}

fn not_found(id: TaskId) -> ServiceError {
    warn!(task_id = %id, "task not found");
    ServiceError::not_found(format!("Task not found with ID: {id}"))
}

fn internal(
    message: &'static str,
    task_id: Option<TaskId>,
) -> impl FnOnce(StoreError) -> ServiceError {
    move |e| {
        match task_id {
            Some(id) => error!(task_id = %id, error = %e, "{message}"),
            None => error!(error = %e, "{message}"),
        }
        ServiceError::internal(message, e)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
