use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::error::AssignmentError;
use super::service::{AssignmentOutcome, RoomAssignmentService};
use crate::housing::domain::GroupId;
use crate::housing::store::EntityStore;
use crate::housing::suites::UndrawnSuitesQuery;

/// Router builder exposing the room assignment workflow over HTTP.
pub fn room_assignment_router<S>(service: Arc<RoomAssignmentService<S>>) -> Router
where
    S: EntityStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/groups/:group_id/room_assignment",
            get(current_handler::<S>)
                .post(assign_handler::<S>)
                .put(reassign_handler::<S>),
        )
        .route(
            "/api/v1/groups/:group_id/room_assignment/preview",
            post(preview_handler::<S>),
        )
        .route("/api/v1/suites/undrawn", get(undrawn_suites_handler::<S>))
        .with_state(service)
}

pub(crate) async fn current_handler<S>(
    State(service): State<Arc<RoomAssignmentService<S>>>,
    Path(group_id): Path<u64>,
) -> Response
where
    S: EntityStore + 'static,
{
    match service.current(GroupId(group_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn preview_handler<S>(
    State(service): State<Arc<RoomAssignmentService<S>>>,
    Path(group_id): Path<u64>,
    axum::Json(fields): axum::Json<BTreeMap<String, String>>,
) -> Response
where
    S: EntityStore + 'static,
{
    match service.preview(GroupId(group_id), &fields) {
        Ok(response) if response.valid => (StatusCode::OK, axum::Json(response)).into_response(),
        Ok(response) => (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(response)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn assign_handler<S>(
    State(service): State<Arc<RoomAssignmentService<S>>>,
    Path(group_id): Path<u64>,
    axum::Json(fields): axum::Json<BTreeMap<String, String>>,
) -> Response
where
    S: EntityStore + 'static,
{
    outcome_response(
        service.assign(GroupId(group_id), &fields),
        StatusCode::CREATED,
    )
}

pub(crate) async fn reassign_handler<S>(
    State(service): State<Arc<RoomAssignmentService<S>>>,
    Path(group_id): Path<u64>,
    axum::Json(fields): axum::Json<BTreeMap<String, String>>,
) -> Response
where
    S: EntityStore + 'static,
{
    outcome_response(service.reassign(GroupId(group_id), &fields), StatusCode::OK)
}

pub(crate) async fn undrawn_suites_handler<S>(
    State(service): State<Arc<RoomAssignmentService<S>>>,
) -> Response
where
    S: EntityStore + 'static,
{
    match UndrawnSuitesQuery::new().call(service.store().as_ref()) {
        Ok(suites) => (StatusCode::OK, axum::Json(suites)).into_response(),
        Err(err) => error_response(AssignmentError::Store(err)),
    }
}

fn outcome_response(
    result: Result<AssignmentOutcome, AssignmentError>,
    success: StatusCode,
) -> Response {
    match result {
        Ok(outcome) if outcome.is_success() => (success, axum::Json(outcome)).into_response(),
        Ok(outcome) => (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: AssignmentError) -> Response {
    let status = match &err {
        AssignmentError::GroupNotFound(_) => StatusCode::NOT_FOUND,
        _ if err.is_contract_violation() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
