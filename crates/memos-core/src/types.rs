//! Core data types for memos.
//!
//! These are the typed entities every other crate works with. Rows coming
//! out of the store are mapped into them once, at the storage boundary, so
//! handlers never see loosely-typed column values.
//!
//! Timestamps are integer Unix seconds throughout.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Enumerations
// ============================================================================

/// Error returned when a stored or submitted enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct UnknownVariant {
    /// Which enumeration was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Role of a user within the instance.
///
/// The first account created on an instance is the `Host`; it may manage
/// other users and workspace settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Host,
    User,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "HOST",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HOST" => Ok(Self::Host),
            "USER" => Ok(Self::User),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// Soft-delete state shared by users and memos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RowStatus {
    #[default]
    Normal,
    Archived,
}

impl RowStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Archived => "ARCHIVED",
        }
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORMAL" => Ok(Self::Normal),
            "ARCHIVED" => Ok(Self::Archived),
            other => Err(UnknownVariant {
                kind: "row status",
                value: other.to_string(),
            }),
        }
    }
}

/// Who may read a memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    /// Only the creator.
    #[default]
    Private,
    /// Any signed-in user.
    Protected,
    /// Everyone, including anonymous readers.
    Public,
}

impl Visibility {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "PRIVATE",
            Self::Protected => "PROTECTED",
            Self::Public => "PUBLIC",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRIVATE" => Ok(Self::Private),
            "PROTECTED" => Ok(Self::Protected),
            "PUBLIC" => Ok(Self::Public),
            other => Err(UnknownVariant {
                kind: "visibility",
                value: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    /// Stable external identifier, used as the token subject.
    pub uid: String,
    pub username: String,
    pub nickname: Option<String>,
    pub role: Role,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub description: Option<String>,
    pub row_status: RowStatus,
    pub created_ts: i64,
    pub updated_ts: i64,
    /// Argon2 PHC string. Never leaves the server.
    #[serde(skip)]
    pub password_hash: String,
}

impl User {
    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    pub fn is_active(&self) -> bool {
        self.row_status == RowStatus::Normal
    }
}

/// A note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub id: i64,
    pub uid: String,
    pub creator_id: i64,
    pub content: String,
    pub visibility: Visibility,
    pub row_status: RowStatus,
    pub created_ts: i64,
    pub updated_ts: i64,
    #[serde(default)]
    pub resource_id_list: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Memo {
    /// Whether a caller may read this memo.
    ///
    /// `viewer` is the caller's user id, or `None` for anonymous requests.
    pub fn is_visible_to(&self, viewer: Option<i64>) -> bool {
        match self.visibility {
            Visibility::Public => true,
            Visibility::Protected => viewer.is_some(),
            Visibility::Private => viewer == Some(self.creator_id),
        }
    }
}

/// A hashtag owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: i64,
    pub creator_id: i64,
    pub name: String,
    pub created_ts: i64,
}

/// An uploaded attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    pub uid: String,
    pub creator_id: i64,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub external_uri: String,
    pub created_ts: i64,
}

impl Resource {
    /// Object store key for this resource's blob.
    pub fn object_key(&self) -> String {
        object_key(&self.uid, &self.filename)
    }
}

/// Object store key for a resource blob: `{uid}/{filename}`.
pub fn object_key(uid: &str, filename: &str) -> String {
    format!("{}/{}", uid, filename)
}

/// Per-user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSetting {
    pub user_id: i64,
    pub locale: String,
    pub appearance: String,
    pub memo_visibility: Visibility,
    pub created_ts: i64,
    pub updated_ts: i64,
}

impl UserSetting {
    pub const DEFAULT_LOCALE: &'static str = "zh";
    pub const DEFAULT_APPEARANCE: &'static str = "system";

    /// Default settings for a user who has never saved any.
    pub fn defaults(user_id: i64, now: i64) -> Self {
        Self {
            user_id,
            locale: Self::DEFAULT_LOCALE.to_string(),
            appearance: Self::DEFAULT_APPEARANCE.to_string(),
            memo_visibility: Visibility::Private,
            created_ts: now,
            updated_ts: now,
        }
    }
}

/// Current time as Unix seconds.
pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}
