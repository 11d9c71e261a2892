use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use futures::StreamExt;
use std::convert::Infallible;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Long-lived NDJSON stream of a task's event log.
///
/// Replays every recorded event, follows new ones live, and closes after a
/// single `STATUS_UPDATE` record once the task reaches a terminal status.
#[utoipa::path(
    get,
    path = "/api/tasks/{id}/events",
    params(
        ("id" = Uuid, Path, description = "Task ID"),
    ),
    responses(
        (status = 200, description = "Newline-delimited JSON event stream"),
        (status = 404, description = "Task not found"),
    ),
    tag = "events"
)]
pub async fn task_events(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let stream =
        orchestrator::subscribe(&state.tasks, &state.events, &state.event_bus, id).await?;

    let body = Body::from_stream(stream.map(|item| {
        let mut line = serde_json::to_string(&item).unwrap_or_else(|_| "{}".to_string());
        line.push('\n');
        Ok::<_, Infallible>(line)
    }));

    Ok(([(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)], body))
}
