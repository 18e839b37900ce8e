//! Session CRUD endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use ciit_common::model::Session;
use serde::Serialize;

use crate::error::ApiResult;
use crate::AppState;

/// Response for a session delete.
#[derive(Debug, Serialize)]
pub struct DeleteSessionResponse {
    pub success: bool,
}

/// GET /api/sessions
///
/// Every stored session, newest start time first.
pub async fn list_sessions(State(state): State<AppState>) -> ApiResult<Json<Vec<Session>>> {
    Ok(Json(state.sessions.list().await?))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Session>> {
    Ok(Json(state.sessions.get(&session_id).await?))
}

/// POST /api/sessions
///
/// Stores a new session. Missing id and start time are assigned server-side,
/// so an empty object is a valid payload. Returns the record as stored.
pub async fn create_session(
    State(state): State<AppState>,
    Json(session): Json<Session>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let session = state.sessions.create(session).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// PUT /api/sessions/:id
///
/// Replaces the stored record wholesale; the id in the path wins over any id
/// in the payload. Last write wins, there is no merge.
pub async fn put_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(session): Json<Session>,
) -> ApiResult<Json<Session>> {
    Ok(Json(state.sessions.put(&session_id, session).await?))
}

/// DELETE /api/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<DeleteSessionResponse>> {
    state.sessions.delete(&session_id).await?;
    Ok(Json(DeleteSessionResponse { success: true }))
}

/// Build session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route(
            "/api/sessions/:id",
            get(get_session).put(put_session).delete(delete_session),
        )
}
