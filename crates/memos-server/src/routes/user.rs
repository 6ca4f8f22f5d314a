//! User profile and setting routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use memos_core::{Role, RowStatus, User, UserSetting};
use memos_store::{UserPatch, UserQuery, UserSettingPatch};
use serde::{Deserialize, Serialize};

use super::page;
use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Profile visible to anyone.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub uid: String,
    pub username: String,
    pub nickname: Option<String>,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub description: Option<String>,
    pub created_ts: i64,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            uid: user.uid,
            username: user.username,
            nickname: user.nickname,
            role: user.role,
            avatar_url: user.avatar_url,
            description: user.description,
            created_ts: user.created_ts,
        }
    }
}

/// Query parameters for GET /api/user.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersParams {
    pub row_status: Option<RowStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/user/me
async fn me(auth: AuthenticatedUser) -> Json<User> {
    Json(auth.user)
}

/// GET /api/user - host only.
async fn list_users(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(params): Query<ListUsersParams>,
) -> ApiResult<Json<Vec<User>>> {
    auth.require_host()?;

    let (limit, offset) = page(params.limit, params.offset);
    let users = state
        .store()
        .list_users(&UserQuery {
            row_status: params.row_status,
            limit,
            offset,
        })
        .await?;

    Ok(Json(users))
}

/// GET /api/user/{id}
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PublicUser>> {
    let user = state.store().get_user(id).await?;
    Ok(Json(user.into()))
}

/// GET /api/user/username/{username}
async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<PublicUser>> {
    let user = state
        .store()
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", username)))?;
    Ok(Json(user.into()))
}

/// PATCH /api/user/{id}
async fn update_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(patch): Json<UserPatch>,
) -> ApiResult<Json<User>> {
    auth.require_self_or_host(id)?;

    if patch
        .username
        .as_deref()
        .is_some_and(|u| u.trim().is_empty())
    {
        return Err(ApiError::BadRequest("username must not be empty".to_string()));
    }

    let user = state.store().update_user(id, &patch).await?;

    tracing::info!(user_id = id, updated_by = auth.id(), "User profile updated");

    Ok(Json(user))
}

/// GET /api/user/{id}/setting
async fn get_setting(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserSetting>> {
    auth.require_self_or_host(id)?;
    // Reject settings for users that do not exist.
    state.store().get_user(id).await?;
    Ok(Json(state.store().get_or_create_user_setting(id).await?))
}

/// PATCH /api/user/{id}/setting
async fn update_setting(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(patch): Json<UserSettingPatch>,
) -> ApiResult<Json<UserSetting>> {
    auth.require_self_or_host(id)?;
    state.store().get_user(id).await?;
    Ok(Json(state.store().update_user_setting(id, &patch).await?))
}

/// Build user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/user", get(list_users))
        .route("/api/user/me", get(me))
        .route("/api/user/username/{username}", get(get_user_by_username))
        .route("/api/user/{id}", get(get_user).patch(update_user))
        .route(
            "/api/user/{id}/setting",
            get(get_setting).patch(update_setting),
        )
}
