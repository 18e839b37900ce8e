//! Catalog read and edit endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use ciit_common::model::{Barrier, Concept, Topic};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::AppState;

/// PATCH /api/concepts/:id/topics request body
#[derive(Debug, Deserialize)]
pub struct UpdateTopicsRequest {
    pub topics: Vec<String>,
}

/// Response for concept edits: the persisted record as stored.
#[derive(Debug, Serialize)]
pub struct ConceptResponse {
    pub success: bool,
    pub concept: Concept,
}

/// Response for a concept create.
#[derive(Debug, Serialize)]
pub struct CreateConceptResponse {
    pub concept: Concept,
}

/// GET /api/topics
///
/// Topic list in file order, served from the in-memory cache.
pub async fn get_topics(State(state): State<AppState>) -> Json<Vec<Topic>> {
    Json(state.catalog.topics().await)
}

/// GET /api/barriers
pub async fn get_barriers(State(state): State<AppState>) -> Json<Vec<Barrier>> {
    Json(state.catalog.barriers().await)
}

/// GET /api/concepts
pub async fn get_concepts(State(state): State<AppState>) -> Json<Vec<Concept>> {
    Json(state.catalog.concepts().await)
}

/// PATCH /api/concepts/:id/topics
///
/// Replaces the concept's topic-id list; every other field is untouched.
pub async fn update_concept_topics(
    State(state): State<AppState>,
    Path(concept_id): Path<String>,
    Json(body): Json<UpdateTopicsRequest>,
) -> ApiResult<Json<ConceptResponse>> {
    let concept = state
        .catalog
        .replace_concept_topics(&concept_id, body.topics)
        .await?;
    Ok(Json(ConceptResponse {
        success: true,
        concept,
    }))
}

/// PUT /api/concepts/:id
///
/// Replaces the whole concept record. The id in the path wins over any id in
/// the payload.
pub async fn update_concept(
    State(state): State<AppState>,
    Path(concept_id): Path<String>,
    Json(record): Json<Concept>,
) -> ApiResult<Json<ConceptResponse>> {
    let concept = state.catalog.replace_concept(&concept_id, record).await?;
    Ok(Json(ConceptResponse {
        success: true,
        concept,
    }))
}

/// POST /api/concepts
///
/// Creates a new concept. Returns 409 when the id (given or derived from the
/// name) is already taken.
pub async fn create_concept(
    State(state): State<AppState>,
    Json(record): Json<Concept>,
) -> ApiResult<(StatusCode, Json<CreateConceptResponse>)> {
    let concept = state.catalog.create_concept(record).await?;
    Ok((StatusCode::CREATED, Json(CreateConceptResponse { concept })))
}

/// Build catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/topics", get(get_topics))
        .route("/api/barriers", get(get_barriers))
        .route("/api/concepts", get(get_concepts).post(create_concept))
        .route("/api/concepts/:id", put(update_concept))
        .route("/api/concepts/:id/topics", patch(update_concept_topics))
        .route("/api/concepts/:id/image", post(super::upload_concept_image))
}
