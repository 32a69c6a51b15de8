use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, ApplicationStatus};
use super::engine::{BoardEngine, BoardError};
use super::store::ApplicationStore;

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionRequest {
    pub(crate) status: ApplicationStatus,
}

/// Router exposing the board, its transitions, and the summary views.
pub fn board_router<S>(engine: Arc<BoardEngine<S>>) -> Router
where
    S: ApplicationStore + 'static,
{
    Router::new()
        .route("/api/v1/board", get(board_handler::<S>))
        .route("/api/v1/board/reload", post(reload_handler::<S>))
        .route(
            "/api/v1/board/applications/:application_id/status",
            post(transition_handler::<S>),
        )
        .route(
            "/api/v1/board/applications/:application_id",
            delete(delete_handler::<S>),
        )
        .route("/api/v1/dashboard", get(dashboard_handler::<S>))
        .route("/api/v1/analytics", get(analytics_handler::<S>))
        .with_state(engine)
}

pub(crate) fn board_error_response(error: &BoardError) -> Response {
    let status = match error {
        BoardError::NotFound(_) => StatusCode::NOT_FOUND,
        BoardError::Conflict(_) | BoardError::ChangesPending(_) | BoardError::LoadSuperseded => {
            StatusCode::CONFLICT
        }
        BoardError::TransitionFailed { .. }
        | BoardError::DeleteFailed { .. }
        | BoardError::LoadFailed(_) => StatusCode::BAD_GATEWAY,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn board_handler<S>(State(engine): State<Arc<BoardEngine<S>>>) -> Response
where
    S: ApplicationStore + 'static,
{
    let payload = json!({
        "columns": engine.board(),
        "pending": engine.pending(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn reload_handler<S>(State(engine): State<Arc<BoardEngine<S>>>) -> Response
where
    S: ApplicationStore + 'static,
{
    match engine.load().await {
        Ok(report) => {
            let rejected: Vec<String> = report
                .rejected
                .iter()
                .map(ToString::to_string)
                .collect();
            let payload = json!({
                "admitted": report.admitted,
                "rejected": rejected,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => board_error_response(&error),
    }
}

pub(crate) async fn transition_handler<S>(
    State(engine): State<Arc<BoardEngine<S>>>,
    Path(application_id): Path<u64>,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let id = ApplicationId(application_id);
    match engine.request_transition(id, request.status).await {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => board_error_response(&error),
    }
}

pub(crate) async fn delete_handler<S>(
    State(engine): State<Arc<BoardEngine<S>>>,
    Path(application_id): Path<u64>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    match engine.delete(ApplicationId(application_id)).await {
        Ok(_) => (StatusCode::OK, axum::Json(json!({ "ok": true }))).into_response(),
        Err(error) => board_error_response(&error),
    }
}

pub(crate) async fn dashboard_handler<S>(State(engine): State<Arc<BoardEngine<S>>>) -> Response
where
    S: ApplicationStore + 'static,
{
    (StatusCode::OK, axum::Json(engine.dashboard())).into_response()
}

pub(crate) async fn analytics_handler<S>(State(engine): State<Arc<BoardEngine<S>>>) -> Response
where
    S: ApplicationStore + 'static,
{
    (StatusCode::OK, axum::Json(engine.analytics())).into_response()
}
