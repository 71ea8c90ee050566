//! Task and comment records plus the request shapes that create them.
//!
//! Only [`TaskInput`] and [`CommentInput`] are ever read from a request body.
//! Server-owned fields (`id`, `createdAt`, `updatedAt`, `comments`,
//! `timeStamp`) are not part of those shapes, so a client cannot set them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::ids::{CommentId, TaskId};
use crate::time::display_format;

// ─────────────────────────────────────────────────────────────────────────────
// Task
// ─────────────────────────────────────────────────────────────────────────────

/// A to-do task with its comments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned identifier.
    pub id: TaskId,
    /// Short title.
    pub title: Option<String>,
    /// Longer free-text description.
    pub description: Option<String>,
    /// Calendar due date (`yyyy-MM-dd` on the wire).
    pub due_date: Option<NaiveDate>,
    /// Completion flag.
    pub completed: bool,
    /// Set once at creation.
    #[serde(with = "display_format")]
    pub created_at: DateTime<Utc>,
    /// Refreshed on create and update.
    #[serde(with = "display_format")]
    pub updated_at: DateTime<Utc>,
    /// Free-text priority label.
    pub priority: Option<String>,
    /// Comments in insertion order.
    pub comments: Vec<Comment>,
}

impl Task {
    /// Build a fresh task from client input.
    ///
    /// The ID is always newly generated and both timestamps are `now`.
    pub fn create(input: TaskInput, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            title: input.title,
            description: input.description,
            due_date: input.due_date,
            completed: input.completed,
            created_at: now,
            updated_at: now,
            priority: input.priority,
            comments: Vec::new(),
        }
    }

    /// Overwrite the client-editable fields and bump `updated_at`.
    ///
    /// `id`, `created_at` and `comments` are left alone.
    pub fn apply_update(&mut self, input: TaskInput, now: DateTime<Utc>) {
        self.title = input.title;
        self.description = input.description;
        self.due_date = input.due_date;
        self.completed = input.completed;
        self.priority = input.priority;
        self.updated_at = now;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Comment
// ─────────────────────────────────────────────────────────────────────────────

/// A note attached to a task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// Server-assigned identifier.
    pub id: CommentId,
    /// Comment body.
    pub text: Option<String>,
    /// Creation time.
    #[serde(rename = "timeStamp", with = "display_format")]
    pub timestamp: DateTime<Utc>,
    /// Owning task. Never serialized.
    #[serde(skip)]
    pub task_id: TaskId,
}

impl Comment {
    /// Build a fresh comment for `task_id`.
    pub fn create(task_id: TaskId, input: CommentInput, now: DateTime<Utc>) -> Self {
        Self {
            id: CommentId::new(),
            text: input.text,
            timestamp: now,
            task_id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request shapes
// ─────────────────────────────────────────────────────────────────────────────

/// Client-editable task fields. Unknown fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    /// Title.
    #[serde(default)]
    pub title: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Completion flag; `false` when missing.
    #[serde(default)]
    pub completed: bool,
    /// Priority label.
    #[serde(default)]
    pub priority: Option<String>,
}

/// Client-supplied comment fields. Unknown fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CommentInput {
    /// Comment body.
    #[serde(default)]
    pub text: Option<String>,
}

/// Listing filters. Accepted and logged, currently not applied.
///
/// An empty value (`?completed=`) counts as absent, and `completed` takes
/// `true/false`, `on/off`, `yes/no` and `1/0`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    /// Free-text search.
    #[serde(default)]
    pub search: Option<String>,
    /// Completion filter.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: Option<bool>,
    /// Due-date filter (`yyyy-MM-dd`).
    #[serde(default, deserialize_with = "optional_date")]
    pub due_date: Option<NaiveDate>,
    /// Named filter preset.
    #[serde(default)]
    pub filter_type: Option<String>,
}

impl TaskQuery {
    /// Whether any filter was supplied.
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.completed.is_none()
            && self.due_date.is_none()
            && self.filter_type.is_none()
    }
}

/// Trimmed query value, `None` when missing or blank.
fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = non_blank(deserializer)? else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(Some(true)),
        "false" | "off" | "no" | "0" => Ok(Some(false)),
        _ => Err(de::Error::custom(format!("invalid boolean value: {raw}"))),
    }
}

fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    non_blank(deserializer)?
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|e| de::Error::custom(format!("invalid date {raw}: {e}")))
        })
        .transpose()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 8, 35, 0).unwrap()
    }

    #[test]
    fn task_input_ignores_server_fields() {
        let input: TaskInput = serde_json::from_value(json!({
            "id": "0190a8c2-3f4e-7b6a-9c1d-2e3f4a5b6c7d",
            "createdAt": "Jan 01, 2020 00:00",
            "comments": [{"text": "smuggled"}],
            "title": "Buy milk",
            "dueDate": "2026-10-20",
            "priority": "high"
        }))
        .unwrap();

        assert_eq!(input.title.as_deref(), Some("Buy milk"));
        assert_eq!(input.due_date, NaiveDate::from_ymd_opt(2026, 10, 20));
        assert_eq!(input.priority.as_deref(), Some("high"));
        assert!(!input.completed);
        assert!(input.description.is_none());
    }

    #[test]
    fn task_input_rejects_bad_due_date() {
        let result = serde_json::from_value::<TaskInput>(json!({"dueDate": "20/10/2026"}));
        assert!(result.is_err());
    }

    #[test]
    fn create_assigns_fresh_id_and_timestamps() {
        let input = TaskInput {
            title: Some("a".into()),
            completed: true,
            ..TaskInput::default()
        };
        let task = Task::create(input, fixed_now());
        assert!(task.completed);
        assert_eq!(task.created_at, fixed_now());
        assert_eq!(task.updated_at, fixed_now());
        assert!(task.comments.is_empty());
        assert_ne!(Task::create(TaskInput::default(), fixed_now()).id, task.id);
    }

    #[test]
    fn apply_update_keeps_identity() {
        let mut task = Task::create(TaskInput::default(), fixed_now());
        let id = task.id;
        let later = fixed_now() + chrono::Duration::minutes(5);
        task.apply_update(
            TaskInput {
                title: Some("renamed".into()),
                priority: Some("low".into()),
                ..TaskInput::default()
            },
            later,
        );
        assert_eq!(task.id, id);
        assert_eq!(task.created_at, fixed_now());
        assert_eq!(task.updated_at, later);
        assert_eq!(task.title.as_deref(), Some("renamed"));
    }

    #[test]
    fn apply_update_overwrites_and_clears_due_date() {
        let mut task = Task::create(
            TaskInput {
                due_date: NaiveDate::from_ymd_opt(2026, 10, 20),
                ..TaskInput::default()
            },
            fixed_now(),
        );

        task.apply_update(
            TaskInput {
                due_date: NaiveDate::from_ymd_opt(2026, 11, 2),
                ..TaskInput::default()
            },
            fixed_now(),
        );
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2026, 11, 2));

        task.apply_update(TaskInput::default(), fixed_now());
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn task_serializes_camel_case_with_display_timestamps() {
        let mut task = Task::create(
            TaskInput {
                title: Some("Buy milk".into()),
                due_date: NaiveDate::from_ymd_opt(2026, 10, 20),
                ..TaskInput::default()
            },
            fixed_now(),
        );
        task.comments.push(Comment::create(
            task.id,
            CommentInput {
                text: Some("hi".into()),
            },
            fixed_now(),
        ));

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], task.id.to_string());
        assert_eq!(json["dueDate"], "2026-10-20");
        assert_eq!(json["createdAt"], "Oct 18, 2026 14:05");
        assert_eq!(json["updatedAt"], "Oct 18, 2026 14:05");
        assert!(json["description"].is_null());
        assert_eq!(json["comments"][0]["text"], "hi");
        assert_eq!(json["comments"][0]["timeStamp"], "Oct 18, 2026 14:05");
        assert!(json["comments"][0].get("taskId").is_none());
        assert!(json["comments"][0].get("task_id").is_none());
    }

    #[test]
    fn comment_input_ignores_extra_fields() {
        let input: CommentInput =
            serde_json::from_value(json!({"id": "x", "text": "note", "timeStamp": "x"})).unwrap();
        assert_eq!(input.text.as_deref(), Some("note"));
    }

    #[test]
    fn task_query_is_empty() {
        assert!(TaskQuery::default().is_empty());
        let q = TaskQuery {
            filter_type: Some("today".into()),
            ..TaskQuery::default()
        };
        assert!(!q.is_empty());
    }

    #[test]
    fn task_query_blank_values_are_absent() {
        let q: TaskQuery = serde_json::from_value(json!({
            "search": "",
            "completed": "",
            "dueDate": "  ",
            "filterType": ""
        }))
        .unwrap();
        assert_eq!(q.completed, None);
        assert_eq!(q.due_date, None);
    }

    #[test]
    fn task_query_accepts_boolean_spellings() {
        for (raw, expected) in [
            ("true", true),
            ("YES", true),
            ("on", true),
            ("1", true),
            ("false", false),
            ("no", false),
            ("Off", false),
            ("0", false),
        ] {
            let q: TaskQuery = serde_json::from_value(json!({ "completed": raw })).unwrap();
            assert_eq!(q.completed, Some(expected), "completed={raw}");
        }
    }

    #[test]
    fn task_query_rejects_garbage() {
        assert!(serde_json::from_value::<TaskQuery>(json!({"completed": "maybe"})).is_err());
        assert!(serde_json::from_value::<TaskQuery>(json!({"dueDate": "tomorrow"})).is_err());
        let q: TaskQuery = serde_json::from_value(json!({"dueDate": "2026-10-20"})).unwrap();
        assert_eq!(q.due_date, NaiveDate::from_ymd_opt(2026, 10, 20));
    }
}
