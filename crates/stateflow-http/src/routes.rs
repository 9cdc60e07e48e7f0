//! Router and request handlers.
//!
//! Thin mapping from HTTP onto [`WorkflowService`]: handlers deserialize the
//! request, call the core, and let [`ApiError`] render failures. No workflow
//! rules live here.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use stateflow::{Action, WorkflowDefinition, WorkflowInstance, WorkflowService};

use crate::error::{ApiError, ApiResult};

/// Build the application router around a shared service.
pub fn router(service: WorkflowService) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/definitions", get(list_definitions).post(submit_definition))
        .route("/definitions/:id", get(get_definition))
        .route("/instances", get(list_instances))
        // POST takes a definition id, GET an instance id.
        .route("/instances/:id", get(get_instance).post(start_instance))
        .route("/instances/:id/actions", get(available_actions))
        .route(
            "/instances/:id/actions/:action_id",
            axum::routing::post(execute_action),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(service)
}

async fn health() -> &'static str {
    "workflow engine is running\n"
}

async fn submit_definition(
    State(service): State<WorkflowService>,
    Json(definition): Json<WorkflowDefinition>,
) -> ApiResult<Json<WorkflowDefinition>> {
    let stored = service.submit_definition(definition)?;
    Ok(Json(stored))
}

async fn get_definition(
    State(service): State<WorkflowService>,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowDefinition>> {
    service
        .definition(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("definition '{id}'")))
}

async fn list_definitions(
    State(service): State<WorkflowService>,
) -> Json<Vec<WorkflowDefinition>> {
    Json(service.definitions())
}

async fn start_instance(
    State(service): State<WorkflowService>,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowInstance>> {
    let instance = service.start_instance(&id)?;
    Ok(Json(instance))
}

async fn execute_action(
    State(service): State<WorkflowService>,
    Path((id, action_id)): Path<(String, String)>,
) -> ApiResult<Json<WorkflowInstance>> {
    let instance = service.execute_action(&id, &action_id)?;
    Ok(Json(instance))
}

async fn get_instance(
    State(service): State<WorkflowService>,
    Path(id): Path<String>,
) -> ApiResult<Json<WorkflowInstance>> {
    service
        .instance(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("instance '{id}'")))
}

async fn list_instances(State(service): State<WorkflowService>) -> Json<Vec<WorkflowInstance>> {
    Json(service.instances())
}

async fn available_actions(
    State(service): State<WorkflowService>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Action>>> {
    let actions = service.available_actions(&id)?;
    Ok(Json(actions))
}
