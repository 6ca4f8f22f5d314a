//! Tag routes. Tags are private to their creator.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use memos_core::Tag;
use memos_store::TagCount;
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for POST /api/tag.
#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: Option<String>,
}

/// Strip a leading `#` and surrounding whitespace.
fn normalise_name(name: &str) -> String {
    let name = name.trim();
    name.strip_prefix('#').unwrap_or(name).trim().to_string()
}

/// GET /api/tag
async fn list_tags(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> ApiResult<Json<Vec<TagCount>>> {
    Ok(Json(state.store().list_tags(auth.id()).await?))
}

/// POST /api/tag
async fn create_tag(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<CreateTagRequest>,
) -> ApiResult<Json<Tag>> {
    let name = request
        .name
        .as_deref()
        .map(normalise_name)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;

    Ok(Json(state.store().create_tag(auth.id(), &name).await?))
}

/// DELETE /api/tag/{id}
async fn delete_tag(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let tag = state.store().get_tag(id).await?;
    if tag.creator_id != auth.id() {
        return Err(ApiError::Forbidden("not the owner of this tag".to_string()));
    }

    state.store().delete_tag(id).await?;

    tracing::info!(tag_id = id, name = %tag.name, "Tag deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Build tag routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tag", get(list_tags).post(create_tag))
        .route("/api/tag/{id}", delete(delete_tag))
}
