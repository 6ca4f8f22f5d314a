//! Client-side view of a memo.
//!
//! The REST API returns flat records keyed by numeric ids and epoch
//! seconds. [`MemoView`] is the shape the client renders: resource-style
//! names, parsed nodes and real timestamps.

use chrono::{DateTime, Utc};
use memos_core::{Node, RowStatus, Visibility, parse};
use serde::{Deserialize, Serialize};

/// Characters of content kept in [`MemoView::snippet`].
pub const SNIPPET_CHARS: usize = 100;

/// A memo as returned by the REST API. Missing fields take defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestMemo {
    pub id: i64,
    pub uid: Option<String>,
    pub creator_id: i64,
    pub content: String,
    pub visibility: Option<Visibility>,
    pub row_status: Option<RowStatus>,
    pub created_ts: Option<i64>,
    pub updated_ts: Option<i64>,
    pub resource_id_list: Vec<i64>,
    pub tags: Vec<String>,
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoView {
    /// `memos/{id}`
    pub name: String,
    pub uid: String,
    /// `users/{creatorId}`
    pub creator: String,
    pub content: String,
    pub nodes: Vec<Node>,
    pub visibility: Visibility,
    pub tags: Vec<String>,
    pub pinned: bool,
    pub resources: Vec<i64>,
    pub snippet: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub display_time: DateTime<Utc>,
    pub state: RowStatus,
}

impl MemoView {
    /// Numeric id from `memos/{id}`.
    pub fn id(&self) -> Option<i64> {
        self.name.strip_prefix("memos/")?.parse().ok()
    }

    pub fn is_archived(&self) -> bool {
        self.state == RowStatus::Archived
    }
}

/// Epoch seconds to a timestamp; missing or out-of-range values read as now.
fn from_epoch(secs: Option<i64>, now: DateTime<Utc>) -> DateTime<Utc> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
        .unwrap_or(now)
}

impl MemoView {
    /// Adapt a REST record, using `now` for missing timestamps.
    pub fn from_rest(memo: RestMemo, now: DateTime<Utc>) -> Self {
        let created = from_epoch(memo.created_ts, now);
        let state = match memo.row_status {
            Some(RowStatus::Archived) => RowStatus::Archived,
            _ => RowStatus::Normal,
        };

        Self {
            name: format!("memos/{}", memo.id),
            uid: memo.uid.unwrap_or_else(|| format!("memo-uid-{}", memo.id)),
            creator: format!("users/{}", memo.creator_id),
            nodes: parse(&memo.content),
            snippet: memo.content.chars().take(SNIPPET_CHARS).collect(),
            content: memo.content,
            visibility: memo.visibility.unwrap_or_default(),
            tags: memo.tags,
            pinned: memo.pinned,
            resources: memo.resource_id_list,
            create_time: created,
            update_time: from_epoch(memo.updated_ts, now),
            display_time: created,
            state,
        }
    }
}

impl From<RestMemo> for MemoView {
    fn from(memo: RestMemo) -> Self {
        Self::from_rest(memo, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_adapts_full_record() {
        let rest: RestMemo = serde_json::from_str(
            r##"{
                "id": 7,
                "uid": "abc",
                "creatorId": 2,
                "content": "# Title\n#rust notes",
                "visibility": "PUBLIC",
                "rowStatus": "ARCHIVED",
                "createdTs": 1600000000,
                "updatedTs": 1600000060,
                "resourceIdList": [4],
                "tags": ["rust"]
            }"##,
        )
        .unwrap();

        let view = MemoView::from_rest(rest, now());
        assert_eq!(view.name, "memos/7");
        assert_eq!(view.id(), Some(7));
        assert_eq!(view.creator, "users/2");
        assert_eq!(view.visibility, Visibility::Public);
        assert!(view.is_archived());
        assert_eq!(view.resources, vec![4]);
        assert_eq!(view.nodes.len(), 2);
        assert_eq!(view.create_time.timestamp(), 1_600_000_000);
        assert_eq!(view.display_time, view.create_time);
        assert_eq!(view.update_time.timestamp(), 1_600_000_060);
        assert!(!view.pinned);
    }

    #[test]
    fn test_defaults_for_sparse_record() {
        let rest: RestMemo = serde_json::from_str(r#"{"id": 3, "content": ""}"#).unwrap();
        let view = MemoView::from_rest(rest, now());

        assert_eq!(view.uid, "memo-uid-3");
        assert_eq!(view.visibility, Visibility::Private);
        assert_eq!(view.state, RowStatus::Normal);
        assert_eq!(view.create_time, now());
        assert!(view.nodes.is_empty());
        assert_eq!(view.snippet, "");
    }

    #[test]
    fn test_snippet_counts_characters() {
        let rest = RestMemo {
            content: "é".repeat(150),
            ..RestMemo::default()
        };
        let view = MemoView::from_rest(rest, now());
        assert_eq!(view.snippet.chars().count(), SNIPPET_CHARS);
    }

    #[test]
    fn test_serialized_field_names() {
        let view = MemoView::from_rest(RestMemo::default(), now());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["state"], "NORMAL");
        assert!(json.get("createTime").is_some());
        assert!(json.get("displayTime").is_some());
    }
}
