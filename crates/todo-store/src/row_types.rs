//! Raw row shapes for the `tasks` and `comments` tables.
//!
//! `rusqlite` row mapping only reads primitive columns. Decoding ids, dates and
//! timestamps into entity types happens afterwards so a bad stored value
//! surfaces as [`StoreError::CorruptRow`] rather than a generic SQL error.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use todo_core::{Comment, CommentId, Task, TaskId};

use crate::errors::{Result, StoreError};

/// `yyyy-MM-dd`, the stored form of a due date.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw row from the `tasks` table.
#[derive(Clone, Debug)]
pub struct TaskRow {
    /// Task ID.
    pub id: String,
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Due date as `yyyy-MM-dd`.
    pub due_date: Option<String>,
    /// Completion flag.
    pub completed: bool,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
    /// Last update timestamp (RFC 3339).
    pub updated_at: String,
    /// Priority label.
    pub priority: Option<String>,
}

impl TaskRow {
    /// Map a `SELECT id, title, description, due_date, completed, created_at,
    /// updated_at, priority` row.
    pub fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            due_date: row.get(3)?,
            completed: row.get::<_, i64>(4)? != 0,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            priority: row.get(7)?,
        })
    }

    /// Decode into a [`Task`] carrying `comments`.
    pub fn into_task(self, comments: Vec<Comment>) -> Result<Task> {
        Ok(Task {
            id: parse_task_id(&self.id, "tasks", "id")?,
            title: self.title,
            description: self.description,
            due_date: self
                .due_date
                .as_deref()
                .map(|raw| parse_date(raw, "tasks", "due_date"))
                .transpose()?,
            completed: self.completed,
            created_at: parse_timestamp(&self.created_at, "tasks", "created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "tasks", "updated_at")?,
            priority: self.priority,
            comments,
        })
    }
}

/// Raw row from the `comments` table.
#[derive(Clone, Debug)]
pub struct CommentRow {
    /// Comment ID.
    pub id: String,
    /// Owning task ID.
    pub task_id: String,
    /// Body.
    pub text: Option<String>,
    /// Creation timestamp (RFC 3339).
    pub timestamp: String,
}

impl CommentRow {
    /// Map a `SELECT id, task_id, text, timestamp` row.
    pub fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            task_id: row.get(1)?,
            text: row.get(2)?,
            timestamp: row.get(3)?,
        })
    }

    /// Decode into a [`Comment`].
    pub fn into_comment(self) -> Result<Comment> {
        Ok(Comment {
            id: CommentId::parse(&self.id).map_err(|e| corrupt("comments", "id", &e))?,
            text: self.text,
            timestamp: parse_timestamp(&self.timestamp, "comments", "timestamp")?,
            task_id: parse_task_id(&self.task_id, "comments", "task_id")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoding helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Stored form of a timestamp: RFC 3339, UTC, microseconds, `Z` suffix.
pub fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Stored form of a due date.
pub fn encode_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_task_id(raw: &str, table: &'static str, column: &'static str) -> Result<TaskId> {
    TaskId::parse(raw).map_err(|e| corrupt(table, column, &e))
}

fn parse_date(raw: &str, table: &'static str, column: &'static str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| corrupt(table, column, &e))
}

fn parse_timestamp(raw: &str, table: &'static str, column: &'static str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| corrupt(table, column, &e))
}

fn corrupt(table: &'static str, column: &'static str, e: &dyn std::fmt::Display) -> StoreError {
    StoreError::CorruptRow {
        table,
        column,
        detail: e.to_string(),
    }
}
