//! Request handlers.
//!
//! Thin plumbing only: validate input into domain types, call the store on
//! the blocking pool, render the result. No business rules live here.

use std::collections::BTreeSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;

use taskvault_core::{
    Description, DuePatch, StoreError, Task, TaskDraft, TaskId, TaskPatch, TaskStatus, UserId,
};
use taskvault_store::TaskFilter;

use crate::api::{
    BulkCreateRequest, BulkCreateResponse, CreateTaskRequest, CreateTaskResponse, HealthResponse,
    OwnerParams, QueryParams, TaskListResponse, TaskResponse, TaskSpec, UpdateTaskRequest,
};
use crate::error::ApiError;
use crate::router::AppState;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<CreateTaskResponse>), ApiError> {
    let user_id = UserId::new(&request.user_id)?;
    let draft = spec_to_draft(&state, request.task)?;

    let store = state.store.clone();
    let id = run_blocking(move || store.create(&user_id, draft)).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse { id: id.to_string() }),
    ))
}

/// POST /tasks/bulk
pub async fn create_tasks_bulk(
    State(state): State<AppState>,
    Json(request): Json<BulkCreateRequest>,
) -> Result<(StatusCode, Json<BulkCreateResponse>), ApiError> {
    let user_id = UserId::new(&request.user_id)?;
    let drafts = request
        .tasks
        .into_iter()
        .map(|spec| spec_to_draft(&state, spec))
        .collect::<Result<Vec<_>, _>>()?;

    let store = state.store.clone();
    let ids = run_blocking(move || store.create_bulk(&user_id, drafts)).await?;
    Ok((
        StatusCode::CREATED,
        Json(BulkCreateResponse {
            ids: ids.iter().map(TaskId::to_string).collect(),
        }),
    ))
}

/// GET /tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let store = state.store.clone();
    let task = run_blocking(move || store.get(&task_id))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(task.into()))
}

/// PUT /tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let user_id = UserId::new(&request.user_id)?;

    let patch = TaskPatch {
        description: request
            .description
            .as_deref()
            .map(Description::new)
            .transpose()?,
        status: parse_status(request.status.as_deref())?,
        due_time: request.due_time.map(|raw| {
            if raw.trim().is_empty() {
                DuePatch::Clear
            } else {
                DuePatch::Text(raw)
            }
        }),
    };

    let store = state.store.clone();
    let task = run_blocking(move || -> Result<Option<Task>, StoreError> {
        if !store.update(&user_id, &task_id, patch)? {
            return Ok(None);
        }
        store.get(&task_id)
    })
    .await?
    .ok_or(ApiError::NotFound)?;
    Ok(Json(task.into()))
}

/// DELETE /tasks/{id}?user_id=...
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<OwnerParams>,
) -> Result<StatusCode, ApiError> {
    let task_id = parse_task_id(&id)?;
    let user_id = UserId::new(&params.user_id)?;

    let store = state.store.clone();
    let deleted = run_blocking(move || store.delete(&user_id, &task_id)).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// GET /tasks?user_id=...&status=a,b&start=...&end=...
pub async fn query_tasks(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let user_id = UserId::new(&params.user_id)?;
    let filter = TaskFilter {
        statuses: parse_status_list(params.status.as_deref())?,
        start: params.start,
        end: params.end,
    };

    let store = state.store.clone();
    let tasks = run_blocking(move || store.query(&user_id, filter)).await?;
    Ok(Json(TaskListResponse {
        total: tasks.len(),
        tasks: tasks.into_iter().map(TaskResponse::from).collect(),
    }))
}

fn spec_to_draft(state: &AppState, spec: TaskSpec) -> Result<TaskDraft, ApiError> {
    let mut draft = TaskDraft::new(Description::new(&spec.description)?);
    if let Some(status) = parse_status(spec.status.as_deref())? {
        draft = draft.with_status(status);
    }
    if let Some(raw) = spec.due_time.as_deref() {
        if !raw.trim().is_empty() {
            draft = draft.with_due_time(state.resolver.resolve(raw)?);
        }
    }
    Ok(draft)
}

fn parse_status(raw: Option<&str>) -> Result<Option<TaskStatus>, ApiError> {
    raw.map(|s| s.parse::<TaskStatus>())
        .transpose()
        .map_err(ApiError::from)
}

fn parse_status_list(raw: Option<&str>) -> Result<Option<BTreeSet<TaskStatus>>, ApiError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let statuses = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<TaskStatus>)
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok(if statuses.is_empty() {
        None
    } else {
        Some(statuses)
    })
}

/// An unparseable id cannot name an existing task, so it resolves to 404
/// rather than 400.
fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.parse::<TaskId>().map_err(|_| ApiError::NotFound)
}

/// Run a store call on the blocking pool; the store is synchronous and must
/// not stall the async executor.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("store task panicked: {e}")))?
        .map_err(ApiError::from)
}
