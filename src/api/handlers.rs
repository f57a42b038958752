//! HTTP request handlers

use super::types::{
    ChoiceRequest, CreateConversationRequest, ErrorResponse, FlowInfo, FlowsResponse,
    SuccessResponse,
};
use super::AppState;
use crate::graph::FlowDocument;
use crate::runtime::{ConversationView, RuntimeError};
use crate::state_machine::TransitionError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Flow listing
        .route("/api/flows", get(list_flows))
        .route("/api/flows/:name", get(get_flow))
        // Mount
        .route("/api/conversations", post(create_conversation))
        // Read / unmount
        .route(
            "/api/conversations/:id",
            get(get_conversation).delete(delete_conversation),
        )
        // User actions
        .route("/api/conversations/:id/choices", post(select_choice))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Flows
// ============================================================

async fn list_flows(State(state): State<AppState>) -> Json<FlowsResponse> {
    let flows = state
        .runtime
        .flows()
        .iter()
        .map(|graph| FlowInfo {
            name: graph.name().to_string(),
            start: graph.start_id().to_string(),
            node_count: graph.len(),
        })
        .collect();

    Json(FlowsResponse { flows })
}

async fn get_flow(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<FlowDocument>, AppError> {
    let graph = state
        .runtime
        .flows()
        .get(&name)
        .ok_or_else(|| AppError::NotFound(format!("unknown flow: {name}")))?;
    Ok(Json(graph.to_document()))
}

// ============================================================
// Conversation Lifecycle
// ============================================================

async fn create_conversation(
    State(state): State<AppState>,
    payload: Result<Json<CreateConversationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ConversationView>), AppError> {
    let Json(req) = payload?;
    let view = state.runtime.create(&req.flow).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationView>, AppError> {
    Ok(Json(state.runtime.view(&id).await?))
}

async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.runtime.discard(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// User Actions
// ============================================================

async fn select_choice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ChoiceRequest>, JsonRejection>,
) -> Result<Json<ConversationView>, AppError> {
    let Json(req) = payload?;
    Ok(Json(state.runtime.select_choice(&id, req.index).await?))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
}

impl From<RuntimeError> for AppError {
    fn from(error: RuntimeError) -> Self {
        let message = error.to_string();
        match error {
            RuntimeError::UnknownFlow(_)
            | RuntimeError::Transition(TransitionError::InvalidChoice { .. }) => {
                AppError::BadRequest(message)
            }
            RuntimeError::NotFound(_) => AppError::NotFound(message),
            // Broken graphs are normally recovered by the runtime
            RuntimeError::Ended(_) | RuntimeError::Transition(TransitionError::BrokenGraph { .. }) => {
                AppError::Conflict(message)
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
