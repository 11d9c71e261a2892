use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use events::Event;
use serde::Serialize;
use taskweave_core::{CreateTaskRequest, PipelineConfig, Task};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTaskResponse {
    pub task_id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "All tasks, newest first", body = Vec<Task>)
    ),
    tag = "tasks"
)]
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, AppError> {
    let tasks = state.tasks.find_all().await?;
    Ok(Json(tasks))
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 202, description = "Task accepted, pipeline runs asynchronously", body = SubmitTaskResponse),
        (status = 400, description = "Missing or empty prompt"),
    ),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<SubmitTaskResponse>), AppError> {
    if payload.prompt.trim().is_empty() {
        return Err(AppError::BadRequest("prompt is required".to_string()));
    }

    let pipeline = payload
        .pipeline_config
        .map(PipelineConfig::new)
        .unwrap_or_default();

    let task = Task::new(payload.prompt.clone());
    let created = state.tasks.create(&task).await?;

    state
        .event_bus
        .publish(Event::TaskCreated {
            task_id: created.id,
        });

    state.supervisor.spawn(created.id, payload.prompt, pipeline);

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitTaskResponse {
            task_id: created.id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(
        ("id" = Uuid, Path, description = "Task ID"),
    ),
    responses(
        (status = 200, description = "The task", body = Task),
        (status = 404, description = "Task not found"),
    ),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, AppError> {
    let task = state.tasks.find_by_id(id).await?;

    match task {
        Some(t) => Ok(Json(t)),
        None => Err(AppError::NotFound(format!("Task not found: {}", id))),
    }
}
