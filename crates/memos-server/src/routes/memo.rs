//! Memo routes.
//!
//! - POST /api/memo - create a memo
//! - GET /api/memo - list memos visible to the caller
//! - GET /api/memo/stats - public memo statistics
//! - GET /api/memo/{id} - read one memo
//! - PATCH /api/memo/{id} - update (creator or host)
//! - DELETE /api/memo/{id} - archive (creator or host)

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use memos_core::{Memo, RowStatus, Visibility, now_ts};
use memos_store::{MemoPatch, MemoQuery, MemoStats, NewMemo};
use serde::Deserialize;

use super::page;
use super::workspace::effective_setting;
use crate::auth::{AuthenticatedUser, MaybeUser};
use crate::config::WorkspaceSettingKey;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/memo.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoRequest {
    pub content: Option<String>,
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub resource_id_list: Vec<i64>,
}

/// Query parameters for GET /api/memo.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMemosParams {
    pub row_status: Option<RowStatus>,
    pub creator_id: Option<i64>,
    pub tag: Option<String>,
    pub visibility: Option<Visibility>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ============================================================================
// Validation
// ============================================================================

/// Memo policy from the `MEMO_RELATED` workspace setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MemoPolicy {
    content_length_limit: Option<usize>,
    disallow_public: bool,
}

impl MemoPolicy {
    fn from_setting(setting: &serde_json::Value) -> Self {
        let section = &setting["memoRelatedSetting"];
        Self {
            content_length_limit: section["contentLengthLimit"]
                .as_u64()
                .and_then(|n| usize::try_from(n).ok()),
            disallow_public: section["disallowPublicVisibility"]
                .as_bool()
                .unwrap_or(false),
        }
    }

    fn check(&self, content: Option<&str>, visibility: Option<Visibility>) -> ApiResult<()> {
        if let (Some(content), Some(limit)) = (content, self.content_length_limit) {
            if content.chars().count() > limit {
                return Err(ApiError::BadRequest(format!(
                    "content exceeds {} characters",
                    limit
                )));
            }
        }
        if self.disallow_public && visibility == Some(Visibility::Public) {
            return Err(ApiError::Forbidden(
                "public memos are disabled on this instance".to_string(),
            ));
        }
        Ok(())
    }
}

async fn memo_policy(state: &AppState) -> ApiResult<MemoPolicy> {
    let setting = effective_setting(state, WorkspaceSettingKey::MemoRelated).await?;
    Ok(MemoPolicy::from_setting(&setting))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /api/memo
async fn create_memo(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<CreateMemoRequest>,
) -> ApiResult<Json<Memo>> {
    let content = request
        .content
        .ok_or_else(|| ApiError::BadRequest("content is required".to_string()))?;
    let visibility = request.visibility.unwrap_or_default();

    memo_policy(&state)
        .await?
        .check(Some(&content), Some(visibility))?;

    let memo = state
        .store()
        .create_memo(&NewMemo {
            creator_id: auth.id(),
            content,
            visibility,
            resource_ids: request.resource_id_list,
        })
        .await?;

    tracing::info!(
        memo_id = memo.id,
        creator_id = memo.creator_id,
        visibility = %memo.visibility,
        tags = memo.tags.len(),
        "Memo created"
    );

    Ok(Json(memo))
}

/// GET /api/memo
async fn list_memos(
    State(state): State<AppState>,
    caller: MaybeUser,
    Query(params): Query<ListMemosParams>,
) -> ApiResult<Json<Vec<Memo>>> {
    let (limit, offset) = page(params.limit, params.offset);

    let memos = state
        .store()
        .list_memos(&MemoQuery {
            viewer: caller.viewer(),
            row_status: params.row_status.unwrap_or_default(),
            creator_id: params.creator_id,
            tag: params.tag.filter(|t| !t.is_empty()),
            visibility: params.visibility,
            limit,
            offset,
        })
        .await?;

    Ok(Json(memos))
}

/// GET /api/memo/stats
async fn memo_stats(State(state): State<AppState>) -> ApiResult<Json<MemoStats>> {
    Ok(Json(state.store().memo_stats(now_ts()).await?))
}

/// GET /api/memo/{id}
async fn get_memo(
    State(state): State<AppState>,
    caller: MaybeUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Memo>> {
    let memo = state.store().get_memo(id).await?;

    if !memo.is_visible_to(caller.viewer()) {
        return Err(ApiError::Forbidden(format!("memo {} is not visible", id)));
    }

    Ok(Json(memo))
}

/// PATCH /api/memo/{id}
async fn update_memo(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(patch): Json<MemoPatch>,
) -> ApiResult<Json<Memo>> {
    let existing = state.store().get_memo(id).await?;
    auth.require_self_or_host(existing.creator_id)?;

    memo_policy(&state)
        .await?
        .check(patch.content.as_deref(), patch.visibility)?;

    let memo = state.store().update_memo(id, &patch).await?;

    if patch.row_status == Some(RowStatus::Archived) {
        tracing::info!(memo_id = id, archived_by = auth.id(), "Memo archived");
    }

    Ok(Json(memo))
}

/// DELETE /api/memo/{id} - archives rather than removes.
async fn archive_memo(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Memo>> {
    let existing = state.store().get_memo(id).await?;
    auth.require_self_or_host(existing.creator_id)?;

    let memo = state.store().archive_memo(id).await?;

    tracing::info!(memo_id = id, archived_by = auth.id(), "Memo archived");

    Ok(Json(memo))
}

/// Build memo routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/memo", get(list_memos).post(create_memo))
        .route("/api/memo/stats", get(memo_stats))
        .route(
            "/api/memo/{id}",
            get(get_memo).patch(update_memo).delete(archive_memo),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_policy_from_defaults() {
        let defaults = crate::config::WorkspaceDefaults::default();
        let policy = MemoPolicy::from_setting(defaults.get(WorkspaceSettingKey::MemoRelated));
        assert_eq!(policy.content_length_limit, Some(10000));
        assert!(!policy.disallow_public);
    }

    #[test]
    fn test_policy_checks() {
        let policy = MemoPolicy::from_setting(&json!({
            "memoRelatedSetting": {
                "contentLengthLimit": 5,
                "disallowPublicVisibility": true
            }
        }));
        assert!(policy.check(Some("12345"), None).is_ok());
        assert!(matches!(
            policy.check(Some("123456"), None),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            policy.check(None, Some(Visibility::Public)),
            Err(ApiError::Forbidden(_))
        ));
        assert!(policy.check(None, Some(Visibility::Protected)).is_ok());
    }

    #[test]
    fn test_policy_tolerates_malformed_setting() {
        let policy = MemoPolicy::from_setting(&json!({"unrelated": true}));
        assert_eq!(policy.content_length_limit, None);
        assert!(policy.check(Some(&"x".repeat(50_000)), Some(Visibility::Public)).is_ok());
    }

    #[test]
    fn test_create_request_defaults() {
        let request: CreateMemoRequest = serde_json::from_str(r#"{"content": "hi"}"#).unwrap();
        assert_eq!(request.visibility, None);
        assert!(request.resource_id_list.is_empty());
    }
}
