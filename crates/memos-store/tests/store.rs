//! Store tests against an in-memory SQLite database.

use memos_core::{Role, RowStatus, Visibility, now_ts};
use memos_store::{
    MemoPatch, MemoQuery, NewMemo, NewResource, NewUser, Store, StoreConfig, StoreError,
    UserPatch, UserQuery, UserSettingPatch,
};

async fn store() -> Store {
    Store::connect(StoreConfig::in_memory())
        .await
        .expect("in-memory store")
}

async fn user(store: &Store, username: &str, role: Role) -> i64 {
    store
        .create_user(&NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            role,
            nickname: None,
            email: None,
        })
        .await
        .unwrap()
        .id
}

fn new_memo(creator_id: i64, content: &str, visibility: Visibility) -> NewMemo {
    NewMemo {
        creator_id,
        content: content.to_string(),
        visibility,
        resource_ids: vec![],
    }
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let store = store().await;
    memos_store::schema::run_migrations(store.pool()).await.unwrap();
    assert!(
        memos_store::schema::is_schema_initialized(store.pool())
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_user_lifecycle() {
    let store = store().await;
    assert_eq!(store.count_active_users().await.unwrap(), 0);

    let host_id = user(&store, "alice", Role::Host).await;
    let user_id = user(&store, "bob", Role::User).await;
    assert_eq!(store.count_active_users().await.unwrap(), 2);

    let alice = store.get_user(host_id).await.unwrap();
    assert_eq!(alice.role, Role::Host);
    assert_eq!(alice.row_status, RowStatus::Normal);
    assert!(!alice.uid.is_empty());

    let by_uid = store.find_user_by_uid(&alice.uid).await.unwrap().unwrap();
    assert_eq!(by_uid.id, host_id);
    assert!(store.find_user_by_username("carol").await.unwrap().is_none());
    assert_eq!(store.first_host().await.unwrap().unwrap().id, host_id);

    let updated = store
        .update_user(
            user_id,
            &UserPatch {
                nickname: Some("Bobby".into()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.nickname.as_deref(), Some("Bobby"));
    assert_eq!(updated.username, "bob");

    store
        .set_user_row_status(user_id, RowStatus::Archived)
        .await
        .unwrap();
    assert_eq!(store.count_active_users().await.unwrap(), 1);

    let archived = store
        .list_users(&UserQuery {
            row_status: Some(RowStatus::Archived),
            ..UserQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].id, user_id);
    assert_eq!(store.list_users(&UserQuery::default()).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_duplicate_username() {
    let store = store().await;
    user(&store, "alice", Role::Host).await;
    let bob = user(&store, "bob", Role::User).await;

    let err = store
        .create_user(&NewUser {
            username: "alice".into(),
            password_hash: "x".into(),
            role: Role::User,
            nickname: None,
            email: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateUsername(ref name) if name == "alice"));

    let err = store
        .update_user(
            bob,
            &UserPatch {
                username: Some("alice".into()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateUsername(_)));
}

#[tokio::test]
async fn test_missing_rows_are_not_found() {
    let store = store().await;
    assert!(matches!(
        store.get_user(42).await.unwrap_err(),
        StoreError::UserNotFound(42)
    ));
    assert!(store.get_memo(7).await.unwrap_err().is_not_found());
    assert!(store.delete_tag(7).await.unwrap_err().is_not_found());
    assert!(store.delete_resource(7).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_user_setting_defaults_and_patch() {
    let store = store().await;
    let id = user(&store, "alice", Role::Host).await;

    let setting = store.get_or_create_user_setting(id).await.unwrap();
    assert_eq!(setting.locale, "zh");
    assert_eq!(setting.appearance, "system");
    assert_eq!(setting.memo_visibility, Visibility::Private);

    let patched = store
        .update_user_setting(
            id,
            &UserSettingPatch {
                locale: Some("en".into()),
                memo_visibility: Some(Visibility::Public),
                ..UserSettingPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.locale, "en");
    assert_eq!(patched.appearance, "system");
    assert_eq!(patched.memo_visibility, Visibility::Public);

    // A second read returns the stored row, not fresh defaults.
    let again = store.get_or_create_user_setting(id).await.unwrap();
    assert_eq!(again.locale, "en");
}

#[tokio::test]
async fn test_memo_create_get_update_archive() {
    let store = store().await;
    let alice = user(&store, "alice", Role::Host).await;

    let memo = store
        .create_memo(&new_memo(alice, "first #draft and #ideas", Visibility::Private))
        .await
        .unwrap();
    assert_eq!(memo.creator_id, alice);
    assert_eq!(memo.row_status, RowStatus::Normal);
    assert_eq!(memo.tags, vec!["draft", "ideas"]);

    let fetched = store.get_memo(memo.id).await.unwrap();
    assert_eq!(fetched, memo);

    let updated = store
        .update_memo(
            memo.id,
            &MemoPatch {
                content: Some("rewritten #final".into()),
                visibility: Some(Visibility::Public),
                ..MemoPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.content, "rewritten #final");
    assert_eq!(updated.visibility, Visibility::Public);
    assert_eq!(updated.tags, vec!["final"]);

    let archived = store.archive_memo(memo.id).await.unwrap();
    assert_eq!(archived.row_status, RowStatus::Archived);
    assert_eq!(archived.content, "rewritten #final");

    let live = store.list_memos(&MemoQuery::default()).await.unwrap();
    assert!(live.is_empty());
    let gone = store
        .list_memos(&MemoQuery {
            viewer: Some(alice),
            row_status: RowStatus::Archived,
            ..MemoQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(gone.len(), 1);
}

#[tokio::test]
async fn test_visibility_filtering() {
    let store = store().await;
    let alice = user(&store, "alice", Role::Host).await;
    let bob = user(&store, "bob", Role::User).await;

    store
        .create_memo(&new_memo(alice, "private", Visibility::Private))
        .await
        .unwrap();
    store
        .create_memo(&new_memo(alice, "protected", Visibility::Protected))
        .await
        .unwrap();
    store
        .create_memo(&new_memo(alice, "public", Visibility::Public))
        .await
        .unwrap();

    let contents = |memos: Vec<memos_core::Memo>| {
        let mut c: Vec<String> = memos.into_iter().map(|m| m.content).collect();
        c.sort();
        c
    };

    let anonymous = store.list_memos(&MemoQuery::default()).await.unwrap();
    assert_eq!(contents(anonymous), vec!["public"]);

    let as_bob = store
        .list_memos(&MemoQuery {
            viewer: Some(bob),
            ..MemoQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(contents(as_bob), vec!["protected", "public"]);

    // Filtering by creator does not widen what a viewer can see.
    let bob_filtering_alice = store
        .list_memos(&MemoQuery {
            viewer: Some(bob),
            creator_id: Some(alice),
            ..MemoQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(contents(bob_filtering_alice), vec!["protected", "public"]);

    let as_alice = store
        .list_memos(&MemoQuery {
            viewer: Some(alice),
            ..MemoQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(contents(as_alice), vec!["private", "protected", "public"]);

    let only_public = store
        .list_memos(&MemoQuery {
            viewer: Some(alice),
            visibility: Some(Visibility::Public),
            ..MemoQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(contents(only_public), vec!["public"]);
}

#[tokio::test]
async fn test_list_paging_newest_first() {
    let store = store().await;
    let alice = user(&store, "alice", Role::Host).await;
    for i in 0..5 {
        store
            .create_memo(&new_memo(alice, &format!("memo {i}"), Visibility::Public))
            .await
            .unwrap();
    }

    let page = store
        .list_memos(&MemoQuery {
            limit: 2,
            offset: 1,
            ..MemoQuery::default()
        })
        .await
        .unwrap();
    let contents: Vec<_> = page.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["memo 3", "memo 2"]);
}

#[tokio::test]
async fn test_tag_resync_and_filter() {
    let store = store().await;
    let alice = user(&store, "alice", Role::Host).await;

    let a = store
        .create_memo(&new_memo(alice, "#rust #async", Visibility::Public))
        .await
        .unwrap();
    store
        .create_memo(&new_memo(alice, "#rust only", Visibility::Public))
        .await
        .unwrap();

    let tagged = store
        .list_memos(&MemoQuery {
            tag: Some("async".into()),
            ..MemoQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].id, a.id);

    let counts = store.list_tags(alice).await.unwrap();
    let summary: Vec<(&str, i64)> = counts
        .iter()
        .map(|t| (t.name.as_str(), t.memo_count))
        .collect();
    assert_eq!(summary, vec![("async", 1), ("rust", 2)]);

    // Dropping a tag from the content unlinks it.
    store
        .update_memo(
            a.id,
            &MemoPatch {
                content: Some("no tags now".into()),
                ..MemoPatch::default()
            },
        )
        .await
        .unwrap();
    let counts = store.list_tags(alice).await.unwrap();
    let summary: Vec<(&str, i64)> = counts
        .iter()
        .map(|t| (t.name.as_str(), t.memo_count))
        .collect();
    assert_eq!(summary, vec![("async", 0), ("rust", 1)]);
}

#[tokio::test]
async fn test_tag_create_is_idempotent_and_delete_unlinks() {
    let store = store().await;
    let alice = user(&store, "alice", Role::Host).await;

    let first = store.create_tag(alice, "books").await.unwrap();
    let second = store.create_tag(alice, "books").await.unwrap();
    assert_eq!(first, second);

    let memo = store
        .create_memo(&new_memo(alice, "reading #books", Visibility::Private))
        .await
        .unwrap();
    assert_eq!(memo.tags, vec!["books"]);

    store.delete_tag(first.id).await.unwrap();
    assert!(store.get_memo(memo.id).await.unwrap().tags.is_empty());
    assert!(store.get_tag(first.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_resources_link_and_delete() {
    let store = store().await;
    let alice = user(&store, "alice", Role::Host).await;
    let bob = user(&store, "bob", Role::User).await;

    let new_resource = |creator_id: i64, uid: &str| NewResource {
        uid: uid.to_string(),
        creator_id,
        filename: "photo.png".into(),
        mime_type: "image/png".into(),
        size: 3,
        external_uri: String::new(),
    };

    let mine = store.create_resource(&new_resource(alice, "r-1")).await.unwrap();
    let theirs = store.create_resource(&new_resource(bob, "r-2")).await.unwrap();
    assert_eq!(mine.object_key(), "r-1/photo.png");

    let memo = store
        .create_memo(&NewMemo {
            creator_id: alice,
            content: "with attachment".into(),
            visibility: Visibility::Private,
            resource_ids: vec![mine.id, theirs.id, 999],
        })
        .await
        .unwrap();
    // Only the creator's own resources are linked.
    assert_eq!(memo.resource_id_list, vec![mine.id]);

    let found = store.find_resource_by_uid("r-1").await.unwrap().unwrap();
    assert_eq!(found.id, mine.id);
    assert_eq!(store.list_resources(alice, 50, 0).await.unwrap().len(), 1);

    let replaced = store
        .update_memo(
            memo.id,
            &MemoPatch {
                resource_ids: Some(vec![]),
                ..MemoPatch::default()
            },
        )
        .await
        .unwrap();
    assert!(replaced.resource_id_list.is_empty());

    store
        .update_memo(
            memo.id,
            &MemoPatch {
                resource_ids: Some(vec![mine.id]),
                ..MemoPatch::default()
            },
        )
        .await
        .unwrap();
    store.delete_resource(mine.id).await.unwrap();
    assert!(store.get_memo(memo.id).await.unwrap().resource_id_list.is_empty());
    assert!(store.get_resource(mine.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_memo_stats_counts_public_memos() {
    let store = store().await;
    let alice = user(&store, "alice", Role::Host).await;

    store
        .create_memo(&new_memo(alice, "a", Visibility::Public))
        .await
        .unwrap();
    store
        .create_memo(&new_memo(alice, "b", Visibility::Public))
        .await
        .unwrap();
    store
        .create_memo(&new_memo(alice, "c", Visibility::Private))
        .await
        .unwrap();

    let stats = store.memo_stats(now_ts()).await.unwrap();
    assert_eq!(stats.total, 2);
    let histogram_total: i64 = stats.daily_histogram.iter().map(|d| d.count).sum();
    assert_eq!(histogram_total, 2);
    for day in &stats.daily_histogram {
        assert_eq!(day.ts % 86_400, 0);
    }
}

#[tokio::test]
async fn test_workspace_settings_persist() {
    let store = store().await;
    assert!(store.get_workspace_setting("GENERAL").await.unwrap().is_none());

    let value = serde_json::json!({"name": "settings/GENERAL", "generalSetting": {"x": 1}});
    store.set_workspace_setting("GENERAL", &value).await.unwrap();
    assert_eq!(
        store.get_workspace_setting("GENERAL").await.unwrap(),
        Some(value.clone())
    );

    let replaced = serde_json::json!({"name": "settings/GENERAL"});
    store
        .set_workspace_setting("GENERAL", &replaced)
        .await
        .unwrap();
    assert_eq!(
        store.get_workspace_setting("GENERAL").await.unwrap(),
        Some(replaced)
    );
}

async fn refuse(store: &Store, name: &str, event: &str) {
    let sql = format!(
        "CREATE TRIGGER {name} BEFORE {event} BEGIN SELECT RAISE(ABORT, '{name}'); END;"
    );
    sqlx::raw_sql(&sql).execute(store.pool()).await.unwrap();
}

async fn attachment(store: &Store, creator_id: i64) -> i64 {
    store
        .create_resource(&NewResource {
            uid: "r-attached".into(),
            creator_id,
            filename: "notes.txt".into(),
            mime_type: "text/plain".into(),
            size: 5,
            external_uri: String::new(),
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_failed_resource_link_leaves_no_memo() {
    let store = store().await;
    let alice = user(&store, "alice", Role::Host).await;
    let resource_id = attachment(&store, alice).await;
    refuse(&store, "refuse_link", "INSERT ON memo_resource").await;

    let result = store
        .create_memo(&NewMemo {
            creator_id: alice,
            content: "half written #lost".into(),
            visibility: Visibility::Private,
            resource_ids: vec![resource_id],
        })
        .await;
    assert!(result.is_err());

    let (memos,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM memo")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(memos, 0);
    assert!(store.list_tags(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_relink_keeps_previous_memo_state() {
    let store = store().await;
    let alice = user(&store, "alice", Role::Host).await;
    let resource_id = attachment(&store, alice).await;
    let memo = store
        .create_memo(&NewMemo {
            creator_id: alice,
            content: "old #keep".into(),
            visibility: Visibility::Private,
            resource_ids: vec![resource_id],
        })
        .await
        .unwrap();
    refuse(&store, "refuse_unlink", "DELETE ON memo_resource").await;

    let result = store
        .update_memo(
            memo.id,
            &MemoPatch {
                content: Some("new #other".into()),
                resource_ids: Some(vec![]),
                ..MemoPatch::default()
            },
        )
        .await;
    assert!(result.is_err());

    let current = store.get_memo(memo.id).await.unwrap();
    assert_eq!(current.content, "old #keep");
    assert_eq!(current.tags, vec!["keep"]);
    assert_eq!(current.resource_id_list, vec![resource_id]);
}

#[tokio::test]
async fn test_failed_tag_delete_keeps_links() {
    let store = store().await;
    let alice = user(&store, "alice", Role::Host).await;
    let memo = store
        .create_memo(&new_memo(alice, "reading #books", Visibility::Private))
        .await
        .unwrap();
    let tag = store.create_tag(alice, "books").await.unwrap();
    refuse(&store, "refuse_tag_delete", "DELETE ON tag").await;

    assert!(store.delete_tag(tag.id).await.is_err());
    assert_eq!(store.get_memo(memo.id).await.unwrap().tags, vec!["books"]);
}

#[tokio::test]
async fn test_failed_resource_delete_keeps_links() {
    let store = store().await;
    let alice = user(&store, "alice", Role::Host).await;
    let resource_id = attachment(&store, alice).await;
    let memo = store
        .create_memo(&NewMemo {
            creator_id: alice,
            content: "with attachment".into(),
            visibility: Visibility::Private,
            resource_ids: vec![resource_id],
        })
        .await
        .unwrap();
    refuse(&store, "refuse_resource_delete", "DELETE ON resource").await;

    assert!(store.delete_resource(resource_id).await.is_err());
    assert_eq!(
        store.get_memo(memo.id).await.unwrap().resource_id_list,
        vec![resource_id]
    );
    assert!(store.get_resource(resource_id).await.is_ok());
}
