pub mod error;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taskweave API",
        version = "0.1.0",
        description = "Multi-agent task pipeline orchestration service"
    ),
    paths(
        routes::health_check,
        routes::list_tasks,
        routes::create_task,
        routes::get_task,
        routes::task_events,
    ),
    components(schemas(
        routes::HealthResponse,
        routes::SubmitTaskResponse,
        taskweave_core::Task,
        taskweave_core::TaskStatus,
        taskweave_core::TaskEvent,
        taskweave_core::EventType,
        taskweave_core::CreateTaskRequest,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "tasks", description = "Task submission and inspection"),
        (name = "events", description = "Live task event streaming (NDJSON)"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health_check))
        .route(
            "/api/tasks",
            get(routes::list_tasks).post(routes::create_task),
        )
        .route("/api/tasks/{id}", get(routes::get_task))
        .route("/api/tasks/{id}/events", get(routes::task_events))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
