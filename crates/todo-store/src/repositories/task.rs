//! Task repository: CRUD for the `tasks` table.
//!
//! A task owns its comments. Loading a task always loads its comments, and
//! saving a task synchronises the stored comment set with `task.comments`.
//! Callers that need the synchronisation to be atomic pass a transaction.

use rusqlite::{Connection, OptionalExtension, params};
use todo_core::{Task, TaskId};

use crate::errors::{Result, StoreError};
use crate::repositories::CommentRepo;
use crate::row_types::{TaskRow, encode_date, encode_timestamp};

/// How many tasks the recent listing returns.
pub const RECENT_TASK_LIMIT: u32 = 5;

const SELECT_COLUMNS: &str = "SELECT id, title, description, due_date, completed, \
                              created_at, updated_at, priority FROM tasks";

/// Task repository. Stateless, every method takes `&Connection`.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert or update a task by ID, then synchronise its comments.
    ///
    /// `created_at` is written on insert only. Comments in `task.comments` are
    /// upserted; stored comments of this task missing from the list are deleted.
    pub fn save(conn: &Connection, task: &Task) -> Result<Task> {
        let _ = conn.execute(
            "INSERT INTO tasks (id, title, description, due_date, completed,
                                created_at, updated_at, priority)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                 title = excluded.title,
                 description = excluded.description,
                 due_date = excluded.due_date,
                 completed = excluded.completed,
                 updated_at = excluded.updated_at,
                 priority = excluded.priority",
            params![
                task.id.to_string(),
                task.title,
                task.description,
                task.due_date.as_ref().map(encode_date),
                task.completed,
                encode_timestamp(&task.created_at),
                encode_timestamp(&task.updated_at),
                task.priority,
            ],
        )?;

        for comment in &task.comments {
            let _ = CommentRepo::save(conn, comment)?;
        }
        let keep: Vec<_> = task.comments.iter().map(|c| c.id).collect();
        let _ = CommentRepo::delete_orphans(conn, &task.id, &keep)?;

        Ok(task.clone())
    }

    /// Get a task by ID with its comments.
    pub fn find_by_id(conn: &Connection, id: &TaskId) -> Result<Option<Task>> {
        let row = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.to_string()],
                TaskRow::map_row,
            )
            .optional()?;
        row.map(|row| Self::hydrate(conn, row)).transpose()
    }

    /// Delete a task and, by cascade, its comments.
    /// [`StoreError::RowNotFound`] if it does not exist.
    pub fn delete_by_id(conn: &Connection, id: &TaskId) -> Result<()> {
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::RowNotFound {
                table: "tasks",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// The `limit` most recently created tasks, newest first, with comments.
    pub fn find_recent(conn: &Connection, limit: u32) -> Result<Vec<Task>> {
        let mut stmt = conn.prepare(&format!(
            "{SELECT_COLUMNS} ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        ))?;
        let rows = stmt
            .query_map(params![limit], TaskRow::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(|row| Self::hydrate(conn, row)).collect()
    }

    fn hydrate(conn: &Connection, row: TaskRow) -> Result<Task> {
        let mut task = row.into_task(Vec::new())?;
        task.comments = CommentRepo::find_by_task(conn, &task.id)?;
        Ok(task)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::repositories::test_support::setup;
    use chrono::{Duration, NaiveDate};
    use todo_core::time::now;
    use todo_core::{Comment, CommentInput, TaskInput};

    fn new_task(title: &str) -> Task {
        Task::create(
            TaskInput {
                title: Some(title.into()),
                ..TaskInput::default()
            },
            now(),
        )
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn save_and_find_roundtrip() {
        let conn = setup();
        let mut task = new_task("Buy milk");
        task.description = Some("2 litres".into());
        task.due_date = NaiveDate::from_ymd_opt(2026, 10, 20);
        task.priority = Some("high".into());
        TaskRepo::save(&conn, &task).unwrap();

        let found = TaskRepo::find_by_id(&conn, &task.id).unwrap().unwrap();
        assert_eq!(found, task);
    }

    #[test]
    fn find_missing_is_none() {
        let conn = setup();
        assert!(TaskRepo::find_by_id(&conn, &TaskId::new()).unwrap().is_none());
    }

    #[test]
    fn save_existing_does_not_move_created_at() {
        let conn = setup();
        let task = new_task("a");
        TaskRepo::save(&conn, &task).unwrap();

        let mut changed = task.clone();
        changed.created_at = task.created_at + Duration::days(3);
        changed.updated_at = task.updated_at + Duration::days(3);
        changed.completed = true;
        TaskRepo::save(&conn, &changed).unwrap();

        let found = TaskRepo::find_by_id(&conn, &task.id).unwrap().unwrap();
        assert_eq!(found.created_at, task.created_at);
        assert_eq!(found.updated_at, changed.updated_at);
        assert!(found.completed);
        assert_eq!(count(&conn, "tasks"), 1);
    }

    #[test]
    fn save_persists_new_comments() {
        let conn = setup();
        let mut task = new_task("a");
        TaskRepo::save(&conn, &task).unwrap();
        task.comments.push(Comment::create(
            task.id,
            CommentInput {
                text: Some("note".into()),
            },
            now(),
        ));
        TaskRepo::save(&conn, &task).unwrap();

        let found = TaskRepo::find_by_id(&conn, &task.id).unwrap().unwrap();
        assert_eq!(found.comments.len(), 1);
        assert_eq!(found.comments[0].text.as_deref(), Some("note"));
    }

    #[test]
    fn save_removes_dropped_comments() {
        let conn = setup();
        let mut task = new_task("a");
        TaskRepo::save(&conn, &task).unwrap();
        for text in ["one", "two"] {
            task.comments.push(Comment::create(
                task.id,
                CommentInput {
                    text: Some(text.into()),
                },
                now(),
            ));
        }
        TaskRepo::save(&conn, &task).unwrap();

        let _ = task.comments.remove(0);
        TaskRepo::save(&conn, &task).unwrap();

        let found = TaskRepo::find_by_id(&conn, &task.id).unwrap().unwrap();
        assert_eq!(found.comments.len(), 1);
        assert_eq!(found.comments[0].text.as_deref(), Some("two"));
        assert_eq!(count(&conn, "comments"), 1);
    }

    #[test]
    fn delete_removes_task_and_comments() {
        let conn = setup();
        let mut task = new_task("a");
        TaskRepo::save(&conn, &task).unwrap();
        task.comments
            .push(Comment::create(task.id, CommentInput::default(), now()));
        TaskRepo::save(&conn, &task).unwrap();

        TaskRepo::delete_by_id(&conn, &task.id).unwrap();
        assert!(TaskRepo::find_by_id(&conn, &task.id).unwrap().is_none());
        assert_eq!(count(&conn, "comments"), 0);
    }

    #[test]
    fn delete_missing_is_row_not_found() {
        let conn = setup();
        let err = TaskRepo::delete_by_id(&conn, &TaskId::new()).unwrap_err();
        assert!(matches!(err, StoreError::RowNotFound { table: "tasks", .. }));
    }

    #[test]
    fn find_recent_is_newest_first_and_limited() {
        let conn = setup();
        let base = now();
        let mut ids = Vec::new();
        for i in 0..7 {
            let mut task = new_task(&format!("task {i}"));
            task.created_at = base + Duration::seconds(i);
            task.updated_at = task.created_at;
            TaskRepo::save(&conn, &task).unwrap();
            ids.push(task.id);
        }

        let recent = TaskRepo::find_recent(&conn, RECENT_TASK_LIMIT).unwrap();
        let got: Vec<_> = recent.iter().map(|t| t.id).collect();
        let expected: Vec<_> = ids.iter().rev().take(5).copied().collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn find_recent_breaks_ties_by_insertion() {
        let conn = setup();
        let at = now();
        let mut first = new_task("first");
        first.created_at = at;
        let mut second = new_task("second");
        second.created_at = at;
        TaskRepo::save(&conn, &first).unwrap();
        TaskRepo::save(&conn, &second).unwrap();

        let recent = TaskRepo::find_recent(&conn, RECENT_TASK_LIMIT).unwrap();
        assert_eq!(recent[0].id, second.id);
        assert_eq!(recent[1].id, first.id);
    }

    #[test]
    fn find_recent_loads_comments() {
        let conn = setup();
        let mut task = new_task("a");
        task.comments
            .push(Comment::create(task.id, CommentInput::default(), now()));
        TaskRepo::save(&conn, &task).unwrap();

        let recent = TaskRepo::find_recent(&conn, RECENT_TASK_LIMIT).unwrap();
        assert_eq!(recent[0].comments.len(), 1);
    }

    #[test]
    fn find_recent_on_empty_table() {
        let conn = setup();
        assert!(TaskRepo::find_recent(&conn, RECENT_TASK_LIMIT).unwrap().is_empty());
    }

    #[test]
    fn corrupt_stored_date_surfaces() {
        let conn = setup();
        let task = new_task("a");
        TaskRepo::save(&conn, &task).unwrap();
        conn.execute(
            "UPDATE tasks SET due_date = 'someday' WHERE id = ?1",
            params![task.id.to_string()],
        )
        .unwrap();

        let err = TaskRepo::find_by_id(&conn, &task.id).unwrap_err();
        assert!(matches!(err, StoreError::CorruptRow { column: "due_date", .. }));
    }
}
