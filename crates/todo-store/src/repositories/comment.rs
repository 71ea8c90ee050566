//! Comment repository: CRUD for the `comments` table.

use rusqlite::{Connection, OptionalExtension, params};
use todo_core::{Comment, CommentId, TaskId};

use crate::errors::{Result, StoreError};
use crate::row_types::{CommentRow, encode_timestamp};

const SELECT_COLUMNS: &str = "SELECT id, task_id, text, timestamp FROM comments";

/// Comment repository. Stateless, every method takes `&Connection`.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert or update a comment by ID.
    pub fn save(conn: &Connection, comment: &Comment) -> Result<Comment> {
        let _ = conn.execute(
            "INSERT INTO comments (id, task_id, text, timestamp)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                 task_id = excluded.task_id,
                 text = excluded.text,
                 timestamp = excluded.timestamp",
            params![
                comment.id.to_string(),
                comment.task_id.to_string(),
                comment.text,
                encode_timestamp(&comment.timestamp),
            ],
        )?;
        Ok(comment.clone())
    }

    /// Get a comment by ID.
    pub fn find_by_id(conn: &Connection, id: &CommentId) -> Result<Option<Comment>> {
        let row = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.to_string()],
                CommentRow::map_row,
            )
            .optional()?;
        row.map(CommentRow::into_comment).transpose()
    }

    /// Delete a comment. [`StoreError::RowNotFound`] if it does not exist.
    pub fn delete_by_id(conn: &Connection, id: &CommentId) -> Result<()> {
        let changed = conn.execute("DELETE FROM comments WHERE id = ?1", params![id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::RowNotFound {
                table: "comments",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// All comments of a task in insertion order.
    pub fn find_by_task(conn: &Connection, task_id: &TaskId) -> Result<Vec<Comment>> {
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE task_id = ?1 ORDER BY rowid ASC"
        ))?;
        let rows = stmt
            .query_map(params![task_id.to_string()], CommentRow::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(CommentRow::into_comment).collect()
    }

    /// Delete every comment of `task_id` whose ID is not in `keep`.
    /// Returns the number removed.
    pub fn delete_orphans(conn: &Connection, task_id: &TaskId, keep: &[CommentId]) -> Result<usize> {
        let mut stmt = conn.prepare("SELECT id FROM comments WHERE task_id = ?1")?;
        let stored = stmt
            .query_map(params![task_id.to_string()], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let keep: Vec<String> = keep.iter().map(ToString::to_string).collect();
        let mut removed = 0;
        for id in stored.iter().filter(|id| !keep.contains(id)) {
            removed += conn.execute("DELETE FROM comments WHERE id = ?1", params![id])?;
        }
        Ok(removed)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
