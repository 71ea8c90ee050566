//! Route handlers for `/api/tasks`.
//!
//! Handlers stay thin: parse the path ID and body, run the service call on the
//! blocking pool (store I/O is synchronous) and serialize the result. A body of
//! literal `null` reaches the service as an absent payload.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use todo_core::{CommentInput, ServiceError, Task, TaskId, TaskInput, TaskQuery};
use todo_service::{TASK_REQUIRED, TaskService};
use tracing::{info, warn};

use crate::errors::ApiError;
use crate::server::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<Option<TaskInput>>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    info!("create task started");
    let Json(input) = body?;
    let task = run(state.service, move |svc| svc.create_task(input)).await?;
    Ok(Json(task))
}

/// PUT /api/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<Option<TaskInput>>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    info!(task_id = %raw_id, "update task started");
    let id = parse_id(&raw_id)?;
    let Json(input) = body?;
    let task = run(state.service, move |svc| svc.update_task(Some(id), input)).await?;
    Ok(Json(task))
}

/// PATCH /api/tasks/{id}
///
/// Only `completed` is read from the body.
pub async fn toggle_completion(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<Option<TaskInput>>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    info!(task_id = %raw_id, "toggle task completion started");
    let id = parse_id(&raw_id)?;
    let Json(input) = body?;
    let Some(input) = input else {
        warn!(task_id = %id, "toggle without a body");
        return Err(ServiceError::invalid_argument(TASK_REQUIRED).into());
    };
    let task = run(state.service, move |svc| {
        svc.toggle_completion(Some(id), input.completed)
    })
    .await?;
    Ok(Json(task))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<StatusCode> {
    info!(task_id = %raw_id, "delete task started");
    let id = parse_id(&raw_id)?;
    run(state.service, move |svc| svc.delete_task(Some(id))).await?;
    Ok(StatusCode::OK)
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Task>> {
    info!(task_id = %raw_id, "get task started");
    let id = parse_id(&raw_id)?;
    let task = run(state.service, move |svc| svc.get_task_by_id(Some(id))).await?;
    Ok(Json(task))
}

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    query: Result<Query<TaskQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    info!("list tasks started");
    let Query(query) = query?;
    let tasks = run(state.service, move |svc| svc.get_tasks(&query)).await?;
    Ok(Json(tasks))
}

/// POST /api/tasks/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<Option<CommentInput>>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    info!(task_id = %raw_id, "add comment started");
    let id = parse_id(&raw_id)?;
    let Json(input) = body?;
    let task = run(state.service, move |svc| svc.add_comment(Some(id), input)).await?;
    Ok(Json(task))
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn parse_id(raw: &str) -> ApiResult<TaskId> {
    TaskId::parse(raw).map_err(|_| {
        warn!(task_id = %raw, "malformed task id");
        ApiError::bad_request(format!("Invalid task ID: {raw}"))
    })
}

/// Run a service call on the blocking pool.
async fn run<T, F>(service: TaskService, op: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&TaskService) -> Result<T, ServiceError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || op(&service)).await?;
    Ok(result?)
}
