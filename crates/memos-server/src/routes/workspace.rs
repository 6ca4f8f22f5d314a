//! Workspace profile and setting routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::AuthenticatedUser;
use crate::config::WorkspaceSettingKey;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response for GET /api/workspace/profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceProfile {
    /// `users/{uid}` of the host, empty before signup.
    pub owner: String,
    pub version: String,
    pub mode: String,
    pub instance_url: String,
}

#[derive(Debug, Deserialize)]
pub struct SettingParams {
    pub name: Option<String>,
}

fn parse_key(name: Option<&str>) -> ApiResult<WorkspaceSettingKey> {
    let name = name.ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;
    WorkspaceSettingKey::from_name(name)
        .ok_or_else(|| ApiError::NotFound(format!("workspace setting {}", name)))
}

/// Persisted override for `key`, or the configured default.
pub(crate) async fn effective_setting(
    state: &AppState,
    key: WorkspaceSettingKey,
) -> ApiResult<Value> {
    match state.store().get_workspace_setting(key.as_str()).await? {
        Some(value) => Ok(value),
        None => Ok(state.config().workspace.get(key).clone()),
    }
}

/// GET /api/workspace/profile
async fn profile(State(state): State<AppState>) -> ApiResult<Json<WorkspaceProfile>> {
    let owner = state
        .store()
        .first_host()
        .await?
        .map(|host| format!("users/{}", host.uid))
        .unwrap_or_default();

    let mode = if cfg!(debug_assertions) { "dev" } else { "prod" };

    Ok(Json(WorkspaceProfile {
        owner,
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: mode.to_string(),
        instance_url: state.config().instance_url.clone(),
    }))
}

/// GET /api/workspace/setting?name=settings/KEY
async fn get_setting(
    State(state): State<AppState>,
    Query(params): Query<SettingParams>,
) -> ApiResult<Json<Value>> {
    let key = parse_key(params.name.as_deref())?;
    Ok(Json(effective_setting(&state, key).await?))
}

/// POST /api/workspace/setting - host only.
///
/// The body is a full setting document; its `name` selects the key.
async fn set_setting(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(mut setting): Json<Value>,
) -> ApiResult<Json<Value>> {
    auth.require_host()?;

    let Some(document) = setting.as_object_mut() else {
        return Err(ApiError::BadRequest(
            "setting must be a JSON object".to_string(),
        ));
    };
    let key = parse_key(document.get("name").and_then(Value::as_str))?;
    document.insert("name".to_string(), Value::String(key.resource_name()));

    state
        .store()
        .set_workspace_setting(key.as_str(), &setting)
        .await?;

    tracing::info!(key = key.as_str(), updated_by = auth.id(), "Workspace setting saved");

    Ok(Json(setting))
}

/// Build workspace routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/workspace/profile", get(profile))
        .route("/api/workspace/setting", get(get_setting).post(set_setting))
}
