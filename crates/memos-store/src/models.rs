//! Database models for the storage layer.
//!
//! Row types map one-to-one onto table columns and are what sqlx decodes
//! into. Each has exactly one `TryFrom` conversion into its memos-core
//! entity; enum columns are validated there and nowhere else. Input
//! structs (`New*`, `*Patch`, `*Query`) describe writes and filters.

use std::str::FromStr;

use memos_core::{
    Memo, Resource, Role, RowStatus, Tag, UnknownVariant, User, UserSetting, Visibility,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Default page size for list queries.
pub const DEFAULT_LIMIT: i64 = 50;

// ============================================================================
// Rows
// ============================================================================

/// Database row for the `user` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub uid: String,
    pub username: String,
    pub nickname: Option<String>,
    pub role: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub description: Option<String>,
    pub password_hash: String,
    pub row_status: String,
    pub created_ts: i64,
    pub updated_ts: i64,
}

impl TryFrom<UserRow> for User {
    type Error = UnknownVariant;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            uid: row.uid,
            username: row.username,
            nickname: row.nickname,
            role: Role::from_str(&row.role)?,
            email: row.email,
            avatar_url: row.avatar_url,
            description: row.description,
            row_status: RowStatus::from_str(&row.row_status)?,
            created_ts: row.created_ts,
            updated_ts: row.updated_ts,
            password_hash: row.password_hash,
        })
    }
}

/// Database row for the `memo` table.
///
/// Resource and tag links live in join tables and are attached by the
/// store after conversion.
#[derive(Debug, Clone, FromRow)]
pub struct MemoRow {
    pub id: i64,
    pub uid: String,
    pub creator_id: i64,
    pub content: String,
    pub visibility: String,
    pub row_status: String,
    pub created_ts: i64,
    pub updated_ts: i64,
}

impl TryFrom<MemoRow> for Memo {
    type Error = UnknownVariant;

    fn try_from(row: MemoRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            uid: row.uid,
            creator_id: row.creator_id,
            content: row.content,
            visibility: Visibility::from_str(&row.visibility)?,
            row_status: RowStatus::from_str(&row.row_status)?,
            created_ts: row.created_ts,
            updated_ts: row.updated_ts,
            resource_id_list: Vec::new(),
            tags: Vec::new(),
        })
    }
}

/// Database row for the `tag` table.
#[derive(Debug, Clone, FromRow)]
pub struct TagRow {
    pub id: i64,
    pub creator_id: i64,
    pub name: String,
    pub created_ts: i64,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            creator_id: row.creator_id,
            name: row.name,
            created_ts: row.created_ts,
        }
    }
}

/// A tag together with how many memos link to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TagCount {
    pub id: i64,
    pub creator_id: i64,
    pub name: String,
    pub created_ts: i64,
    pub memo_count: i64,
}

/// Database row for the `resource` table.
#[derive(Debug, Clone, FromRow)]
pub struct ResourceRow {
    pub id: i64,
    pub uid: String,
    pub creator_id: i64,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub external_uri: String,
    pub created_ts: i64,
}

impl From<ResourceRow> for Resource {
    fn from(row: ResourceRow) -> Self {
        Self {
            id: row.id,
            uid: row.uid,
            creator_id: row.creator_id,
            filename: row.filename,
            mime_type: row.mime_type,
            size: row.size,
            external_uri: row.external_uri,
            created_ts: row.created_ts,
        }
    }
}

/// Database row for the `user_setting` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSettingRow {
    pub user_id: i64,
    pub locale: String,
    pub appearance: String,
    pub memo_visibility: String,
    pub created_ts: i64,
    pub updated_ts: i64,
}

impl TryFrom<UserSettingRow> for UserSetting {
    type Error = UnknownVariant;

    fn try_from(row: UserSettingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: row.user_id,
            locale: row.locale,
            appearance: row.appearance,
            memo_visibility: Visibility::from_str(&row.memo_visibility)?,
            created_ts: row.created_ts,
            updated_ts: row.updated_ts,
        })
    }
}

/// Database row for the `workspace_setting` table.
#[derive(Debug, Clone, FromRow)]
pub struct WorkspaceSettingRow {
    pub key: String,
    pub value: String,
    pub updated_ts: i64,
}

// ============================================================================
// Inputs
// ============================================================================

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub nickname: Option<String>,
    pub email: Option<String>,
}

/// Partial profile update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub username: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub description: Option<String>,
}

/// Filter for listing users.
#[derive(Debug, Clone)]
pub struct UserQuery {
    pub row_status: Option<RowStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            row_status: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Partial user setting update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettingPatch {
    pub locale: Option<String>,
    pub appearance: Option<String>,
    pub memo_visibility: Option<Visibility>,
}

/// Input for creating a memo.
#[derive(Debug, Clone)]
pub struct NewMemo {
    pub creator_id: i64,
    pub content: String,
    pub visibility: Visibility,
    pub resource_ids: Vec<i64>,
}

/// Partial memo update.
///
/// `resource_ids`, when present, replaces the memo's resource links.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoPatch {
    pub content: Option<String>,
    pub visibility: Option<Visibility>,
    pub row_status: Option<RowStatus>,
    #[serde(rename = "resourceIdList")]
    pub resource_ids: Option<Vec<i64>>,
}

/// Filter for listing memos.
#[derive(Debug, Clone)]
pub struct MemoQuery {
    /// Caller's user id; `None` for anonymous requests. Only memos visible
    /// to the viewer are returned.
    pub viewer: Option<i64>,
    pub row_status: RowStatus,
    pub creator_id: Option<i64>,
    pub tag: Option<String>,
    pub visibility: Option<Visibility>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for MemoQuery {
    fn default() -> Self {
        Self {
            viewer: None,
            row_status: RowStatus::Normal,
            creator_id: None,
            tag: None,
            visibility: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Input for recording an uploaded resource.
#[derive(Debug, Clone)]
pub struct NewResource {
    pub uid: String,
    pub creator_id: i64,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub external_uri: String,
}

// ============================================================================
// Aggregates
// ============================================================================

/// Memos created on one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// Midnight UTC of the day, Unix seconds.
    pub ts: i64,
    pub count: i64,
}

/// Public memo statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoStats {
    pub total: i64,
    /// Newest day first.
    pub daily_histogram: Vec<DailyCount>,
}
