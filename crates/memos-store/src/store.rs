//! Main store implementation for database operations.
//!
//! The `Store` type provides all CRUD operations for users, settings,
//! memos, tags, resources and workspace settings. Every row leaves this
//! module as a memos-core entity.

use std::str::FromStr;

use memos_core::{Memo, Resource, RowStatus, Tag, User, UserSetting, extract_tags, now_ts};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::*;
use crate::schema;

const USER_COLUMNS: &str = "id, uid, username, nickname, role, email, avatar_url, description, \
                            password_hash, row_status, created_ts, updated_ts";

const MEMO_COLUMNS: &str =
    "m.id, m.uid, m.creator_id, m.content, m.visibility, m.row_status, m.created_ts, m.updated_ts";

const RESOURCE_COLUMNS: &str =
    "id, uid, creator_id, filename, mime_type, size, external_uri, created_ts";

/// Window covered by the memo statistics histogram.
pub const STATS_WINDOW_SECS: i64 = 30 * 24 * 60 * 60;

/// Configuration for connecting to the database.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database connection URL.
    pub database_url: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Minimum number of connections to maintain.
    pub min_connections: u32,
    /// Run migrations on connect.
    pub run_migrations: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://memos.db".to_string(),
            max_connections: 10,
            min_connections: 1,
            run_migrations: true,
        }
    }
}

impl StoreConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `DATABASE_URL` - Required database connection string
    /// - `DATABASE_MAX_CONNECTIONS` - Optional, defaults to 10
    /// - `DATABASE_MIN_CONNECTIONS` - Optional, defaults to 1
    /// - `DATABASE_RUN_MIGRATIONS` - Optional, defaults to true
    pub fn from_env() -> StoreResult<Self> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            StoreError::ConfigError("DATABASE_URL environment variable not set".to_string())
        })?;

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let min_connections = std::env::var("DATABASE_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        let run_migrations = std::env::var("DATABASE_RUN_MIGRATIONS")
            .ok()
            .map(|s| s.to_lowercase() != "false" && s != "0")
            .unwrap_or(true);

        Ok(Self {
            database_url,
            max_connections,
            min_connections,
            run_migrations,
        })
    }

    /// Single-connection in-memory database, migrated on connect.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:")
    }
}

/// Database store for memos.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Connect to the database with the given configuration.
    ///
    /// Database files are created if missing. Optionally runs migrations if
    /// `config.run_migrations` is true.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        tracing::info!("Connecting to database...");

        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections);

        // An in-memory database lives and dies with its connection.
        if config.is_in_memory() {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;

        tracing::info!("Connected to database");

        if config.run_migrations {
            schema::run_migrations(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Create a store from an existing connection pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ==================== User Operations ====================

    /// Number of users with `NORMAL` row status.
    pub async fn count_active_users(&self) -> StoreResult<i64> {
        let result: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM user WHERE row_status = ?"#)
            .bind(RowStatus::Normal.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }

    /// Insert a new user with a fresh uid.
    pub async fn create_user(&self, user: &NewUser) -> StoreResult<User> {
        let now = now_ts();
        let sql = format!(
            r#"
            INSERT INTO user (uid, username, nickname, role, email, password_hash,
                              row_status, created_ts, updated_ts)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(&user.username)
            .bind(&user.nickname)
            .bind(user.role.as_str())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(RowStatus::Normal.as_str())
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| username_conflict(e, &user.username))?;

        Ok(User::try_from(row)?)
    }

    /// Get a user by id.
    pub async fn get_user(&self, id: i64) -> StoreResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM user WHERE id = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::UserNotFound(id))?;

        Ok(User::try_from(row)?)
    }

    /// Get a user by username.
    pub async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM user WHERE username = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::try_from).transpose()?)
    }

    /// Get a user by uid (the token subject).
    pub async fn find_user_by_uid(&self, uid: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM user WHERE uid = ?");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::try_from).transpose()?)
    }

    /// The earliest-created host, who owns the instance.
    pub async fn first_host(&self) -> StoreResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM user WHERE role = 'HOST' ORDER BY created_ts, id LIMIT 1"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::try_from).transpose()?)
    }

    /// List users, oldest first.
    pub async fn list_users(&self, query: &UserQuery) -> StoreResult<Vec<User>> {
        let mut sql = format!("SELECT {USER_COLUMNS} FROM user");
        if query.row_status.is_some() {
            sql.push_str(" WHERE row_status = ?");
        }
        sql.push_str(" ORDER BY created_ts, id LIMIT ? OFFSET ?");

        let mut q = sqlx::query_as::<_, UserRow>(&sql);
        if let Some(row_status) = query.row_status {
            q = q.bind(row_status.as_str());
        }

        q.bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|row| User::try_from(row).map_err(StoreError::from))
            .collect()
    }

    /// Apply a partial profile update.
    pub async fn update_user(&self, id: i64, patch: &UserPatch) -> StoreResult<User> {
        let sql = format!(
            r#"
            UPDATE user SET
                username = COALESCE(?, username),
                nickname = COALESCE(?, nickname),
                email = COALESCE(?, email),
                avatar_url = COALESCE(?, avatar_url),
                description = COALESCE(?, description),
                updated_ts = ?
            WHERE id = ?
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&patch.username)
            .bind(&patch.nickname)
            .bind(&patch.email)
            .bind(&patch.avatar_url)
            .bind(&patch.description)
            .bind(now_ts())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| username_conflict(e, patch.username.as_deref().unwrap_or_default()))?
            .ok_or(StoreError::UserNotFound(id))?;

        Ok(User::try_from(row)?)
    }

    /// Set a user's row status.
    pub async fn set_user_row_status(&self, id: i64, row_status: RowStatus) -> StoreResult<()> {
        let result = sqlx::query(r#"UPDATE user SET row_status = ?, updated_ts = ? WHERE id = ?"#)
            .bind(row_status.as_str())
            .bind(now_ts())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::UserNotFound(id));
        }
        Ok(())
    }

    // ==================== User Setting Operations ====================

    /// Get a user's setting, creating the default row on first read.
    pub async fn get_or_create_user_setting(&self, user_id: i64) -> StoreResult<UserSetting> {
        let defaults = UserSetting::defaults(user_id, now_ts());
        sqlx::query(
            r#"
            INSERT INTO user_setting (user_id, locale, appearance, memo_visibility,
                                      created_ts, updated_ts)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(defaults.user_id)
        .bind(&defaults.locale)
        .bind(&defaults.appearance)
        .bind(defaults.memo_visibility.as_str())
        .bind(defaults.created_ts)
        .bind(defaults.updated_ts)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, UserSettingRow>(
            r#"
            SELECT user_id, locale, appearance, memo_visibility, created_ts, updated_ts
            FROM user_setting WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(UserSetting::try_from(row)?)
    }

    /// Partially update a user's setting, creating it first if needed.
    pub async fn update_user_setting(
        &self,
        user_id: i64,
        patch: &UserSettingPatch,
    ) -> StoreResult<UserSetting> {
        self.get_or_create_user_setting(user_id).await?;

        let row = sqlx::query_as::<_, UserSettingRow>(
            r#"
            UPDATE user_setting SET
                locale = COALESCE(?, locale),
                appearance = COALESCE(?, appearance),
                memo_visibility = COALESCE(?, memo_visibility),
                updated_ts = ?
            WHERE user_id = ?
            RETURNING user_id, locale, appearance, memo_visibility, created_ts, updated_ts
            "#,
        )
        .bind(&patch.locale)
        .bind(&patch.appearance)
        .bind(patch.memo_visibility.map(|v| v.as_str()))
        .bind(now_ts())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(UserSetting::try_from(row)?)
    }

    // ==================== Memo Operations ====================

    /// Insert a new memo, link its resources and sync its tags in one
    /// transaction.
    pub async fn create_memo(&self, memo: &NewMemo) -> StoreResult<Memo> {
        let now = now_ts();
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, MemoRow>(
            r#"
            INSERT INTO memo (uid, creator_id, content, visibility, row_status,
                              created_ts, updated_ts)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, uid, creator_id, content, visibility, row_status,
                      created_ts, updated_ts
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(memo.creator_id)
        .bind(&memo.content)
        .bind(memo.visibility.as_str())
        .bind(RowStatus::Normal.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        link_resources(&mut tx, row.id, row.creator_id, &memo.resource_ids).await?;
        sync_tags(&mut tx, row.id, row.creator_id, &row.content).await?;

        let memo = hydrate_memo(&mut tx, row).await?;
        tx.commit().await?;
        Ok(memo)
    }

    /// Get a memo by id, with its resource and tag links.
    pub async fn get_memo(&self, id: i64) -> StoreResult<Memo> {
        let sql = format!("SELECT {MEMO_COLUMNS} FROM memo m WHERE m.id = ?");
        let row = sqlx::query_as::<_, MemoRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::MemoNotFound(id))?;

        let mut conn = self.pool.acquire().await?;
        hydrate_memo(&mut conn, row).await
    }

    /// List memos visible to `query.viewer`, newest first.
    pub async fn list_memos(&self, query: &MemoQuery) -> StoreResult<Vec<Memo>> {
        let mut sql = format!(
            r#"
            SELECT {MEMO_COLUMNS}
            FROM memo m
            WHERE m.row_status = ?
              AND (m.visibility = 'PUBLIC'
                   OR (m.visibility = 'PROTECTED' AND ? IS NOT NULL)
                   OR m.creator_id = ?)
            "#
        );

        if query.creator_id.is_some() {
            sql.push_str(" AND m.creator_id = ?");
        }

        if query.visibility.is_some() {
            sql.push_str(" AND m.visibility = ?");
        }

        if query.tag.is_some() {
            sql.push_str(
                r#"
                AND EXISTS (
                    SELECT 1 FROM memo_tag mt
                    JOIN tag t ON t.id = mt.tag_id
                    WHERE mt.memo_id = m.id AND t.name = ?
                )
                "#,
            );
        }

        sql.push_str(" ORDER BY m.created_ts DESC, m.id DESC LIMIT ? OFFSET ?");

        let mut q = sqlx::query_as::<_, MemoRow>(&sql)
            .bind(query.row_status.as_str())
            .bind(query.viewer)
            .bind(query.viewer);

        if let Some(creator_id) = query.creator_id {
            q = q.bind(creator_id);
        }

        if let Some(visibility) = query.visibility {
            q = q.bind(visibility.as_str());
        }

        if let Some(ref tag) = query.tag {
            q = q.bind(tag);
        }

        let rows = q
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        let mut conn = self.pool.acquire().await?;
        let mut memos = Vec::with_capacity(rows.len());
        for row in rows {
            memos.push(hydrate_memo(&mut conn, row).await?);
        }
        Ok(memos)
    }

    /// Apply a partial update.
    ///
    /// New content resyncs the tag links; `resource_ids`, when given,
    /// replaces the resource links. All of it commits or none of it does.
    pub async fn update_memo(&self, id: i64, patch: &MemoPatch) -> StoreResult<Memo> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, MemoRow>(
            r#"
            UPDATE memo SET
                content = COALESCE(?, content),
                visibility = COALESCE(?, visibility),
                row_status = COALESCE(?, row_status),
                updated_ts = ?
            WHERE id = ?
            RETURNING id, uid, creator_id, content, visibility, row_status,
                      created_ts, updated_ts
            "#,
        )
        .bind(&patch.content)
        .bind(patch.visibility.map(|v| v.as_str()))
        .bind(patch.row_status.map(|s| s.as_str()))
        .bind(now_ts())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::MemoNotFound(id))?;

        if patch.content.is_some() {
            sync_tags(&mut tx, row.id, row.creator_id, &row.content).await?;
        }

        if let Some(ref resource_ids) = patch.resource_ids {
            sqlx::query(r#"DELETE FROM memo_resource WHERE memo_id = ?"#)
                .bind(row.id)
                .execute(&mut *tx)
                .await?;
            link_resources(&mut tx, row.id, row.creator_id, resource_ids).await?;
        }

        let memo = hydrate_memo(&mut tx, row).await?;
        tx.commit().await?;
        Ok(memo)
    }

    /// Archive a memo (soft delete).
    pub async fn archive_memo(&self, id: i64) -> StoreResult<Memo> {
        self.update_memo(
            id,
            &MemoPatch {
                row_status: Some(RowStatus::Archived),
                ..MemoPatch::default()
            },
        )
        .await
    }

    /// Public memo total and a per-day histogram of the 30 days before `now`.
    pub async fn memo_stats(&self, now: i64) -> StoreResult<MemoStats> {
        let total: (i64,) = sqlx::query_as(
            r#"SELECT COUNT(*) FROM memo WHERE row_status = 'NORMAL' AND visibility = 'PUBLIC'"#,
        )
        .fetch_one(&self.pool)
        .await?;

        let days: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT CAST(strftime('%s', date(created_ts, 'unixepoch')) AS INTEGER) AS day,
                   COUNT(*) AS count
            FROM memo
            WHERE row_status = 'NORMAL'
              AND visibility = 'PUBLIC'
              AND created_ts > ?
            GROUP BY day
            ORDER BY day DESC
            "#,
        )
        .bind(now - STATS_WINDOW_SECS)
        .fetch_all(&self.pool)
        .await?;

        Ok(MemoStats {
            total: total.0,
            daily_histogram: days
                .into_iter()
                .map(|(ts, count)| DailyCount { ts, count })
                .collect(),
        })
    }

    /// Replace a memo's tag links with the tags found in `content`.
    ///
    /// Each tag is best effort: a failure is logged and the tag skipped.
    pub async fn sync_memo_tags(
        &self,
        memo_id: i64,
        creator_id: i64,
        content: &str,
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sync_tags(&mut tx, memo_id, creator_id, content).await?;
        tx.commit().await?;
        Ok(())
    }

    // ==================== Tag Operations ====================

    /// Create a tag, or return the existing one with the same name.
    pub async fn create_tag(&self, creator_id: i64, name: &str) -> StoreResult<Tag> {
        let mut conn = self.pool.acquire().await?;
        upsert_tag(&mut conn, creator_id, name).await
    }

    /// Get a tag by id.
    pub async fn get_tag(&self, id: i64) -> StoreResult<Tag> {
        sqlx::query_as::<_, TagRow>(
            r#"SELECT id, creator_id, name, created_ts FROM tag WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Tag::from)
        .ok_or(StoreError::TagNotFound(id))
    }

    /// A user's tags with the number of live memos linking each.
    pub async fn list_tags(&self, creator_id: i64) -> StoreResult<Vec<TagCount>> {
        Ok(sqlx::query_as::<_, TagCount>(
            r#"
            SELECT t.id, t.creator_id, t.name, t.created_ts, COUNT(m.id) AS memo_count
            FROM tag t
            LEFT JOIN memo_tag mt ON mt.tag_id = t.id
            LEFT JOIN memo m ON m.id = mt.memo_id AND m.row_status = 'NORMAL'
            WHERE t.creator_id = ?
            GROUP BY t.id, t.creator_id, t.name, t.created_ts
            ORDER BY t.name
            "#,
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Delete a tag and its memo links.
    pub async fn delete_tag(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(r#"DELETE FROM memo_tag WHERE tag_id = ?"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(r#"DELETE FROM tag WHERE id = ?"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::TagNotFound(id));
        }
        tx.commit().await?;
        Ok(())
    }

    // ==================== Resource Operations ====================

    /// Record an uploaded resource.
    pub async fn create_resource(&self, resource: &NewResource) -> StoreResult<Resource> {
        let sql = format!(
            r#"
            INSERT INTO resource (uid, creator_id, filename, mime_type, size,
                                  external_uri, created_ts)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {RESOURCE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(&resource.uid)
            .bind(resource.creator_id)
            .bind(&resource.filename)
            .bind(&resource.mime_type)
            .bind(resource.size)
            .bind(&resource.external_uri)
            .bind(now_ts())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    /// Get a resource by id.
    pub async fn get_resource(&self, id: i64) -> StoreResult<Resource> {
        let sql = format!("SELECT {RESOURCE_COLUMNS} FROM resource WHERE id = ?");
        sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Resource::from)
            .ok_or(StoreError::ResourceNotFound(id))
    }

    /// Get a resource by uid.
    pub async fn find_resource_by_uid(&self, uid: &str) -> StoreResult<Option<Resource>> {
        let sql = format!("SELECT {RESOURCE_COLUMNS} FROM resource WHERE uid = ?");
        Ok(sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?
            .map(Resource::from))
    }

    /// A user's resources, newest first.
    pub async fn list_resources(
        &self,
        creator_id: i64,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Resource>> {
        let sql = format!(
            "SELECT {RESOURCE_COLUMNS} FROM resource WHERE creator_id = ? \
             ORDER BY created_ts DESC, id DESC LIMIT ? OFFSET ?"
        );
        Ok(sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(creator_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Resource::from)
            .collect())
    }

    /// Delete a resource record and its memo links.
    pub async fn delete_resource(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(r#"DELETE FROM memo_resource WHERE resource_id = ?"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(r#"DELETE FROM resource WHERE id = ?"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ResourceNotFound(id));
        }
        tx.commit().await?;
        Ok(())
    }

    // ==================== Workspace Setting Operations ====================

    /// Persisted override for a workspace setting key.
    pub async fn get_workspace_setting(&self, key: &str) -> StoreResult<Option<serde_json::Value>> {
        let row = sqlx::query_as::<_, WorkspaceSettingRow>(
            r#"SELECT key, value, updated_ts FROM workspace_setting WHERE key = ?"#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(serde_json::from_str(&row.value)?)),
            None => Ok(None),
        }
    }

    /// Persist a workspace setting override.
    pub async fn set_workspace_setting(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO workspace_setting (key, value, updated_ts) VALUES (?, ?, ?)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_ts = excluded.updated_ts
            "#,
        )
        .bind(key)
        .bind(serde_json::to_string(value)?)
        .bind(now_ts())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

async fn hydrate_memo(conn: &mut SqliteConnection, row: MemoRow) -> StoreResult<Memo> {
    let mut memo = Memo::try_from(row)?;

    let resource_ids: Vec<(i64,)> = sqlx::query_as(
        r#"SELECT resource_id FROM memo_resource WHERE memo_id = ? ORDER BY resource_id"#,
    )
    .bind(memo.id)
    .fetch_all(&mut *conn)
    .await?;

    let tags: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT t.name FROM tag t
        JOIN memo_tag mt ON mt.tag_id = t.id
        WHERE mt.memo_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(memo.id)
    .fetch_all(&mut *conn)
    .await?;

    memo.resource_id_list = resource_ids.into_iter().map(|(id,)| id).collect();
    memo.tags = tags.into_iter().map(|(name,)| name).collect();
    Ok(memo)
}

/// Link resources owned by `creator_id`; ids of other users' or missing
/// resources are skipped.
async fn link_resources(
    conn: &mut SqliteConnection,
    memo_id: i64,
    creator_id: i64,
    resource_ids: &[i64],
) -> StoreResult<()> {
    for resource_id in resource_ids {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO memo_resource (memo_id, resource_id)
            SELECT ?, id FROM resource WHERE id = ? AND creator_id = ?
            "#,
        )
        .bind(memo_id)
        .bind(*resource_id)
        .bind(creator_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(memo_id, resource_id, "resource not linked");
        }
    }
    Ok(())
}

async fn sync_tags(
    conn: &mut SqliteConnection,
    memo_id: i64,
    creator_id: i64,
    content: &str,
) -> StoreResult<()> {
    sqlx::query(r#"DELETE FROM memo_tag WHERE memo_id = ?"#)
        .bind(memo_id)
        .execute(&mut *conn)
        .await?;

    for name in extract_tags(content) {
        if let Err(e) = link_tag(&mut *conn, memo_id, creator_id, &name).await {
            tracing::warn!(memo_id, tag = %name, error = %e, "Failed to link tag");
        }
    }
    Ok(())
}

async fn link_tag(
    conn: &mut SqliteConnection,
    memo_id: i64,
    creator_id: i64,
    name: &str,
) -> StoreResult<()> {
    let tag = upsert_tag(&mut *conn, creator_id, name).await?;
    sqlx::query(r#"INSERT OR IGNORE INTO memo_tag (memo_id, tag_id) VALUES (?, ?)"#)
        .bind(memo_id)
        .bind(tag.id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn upsert_tag(conn: &mut SqliteConnection, creator_id: i64, name: &str) -> StoreResult<Tag> {
    sqlx::query(
        r#"
        INSERT INTO tag (creator_id, name, created_ts) VALUES (?, ?, ?)
        ON CONFLICT (creator_id, name) DO NOTHING
        "#,
    )
    .bind(creator_id)
    .bind(name)
    .bind(now_ts())
    .execute(&mut *conn)
    .await?;

    let row = sqlx::query_as::<_, TagRow>(
        r#"SELECT id, creator_id, name, created_ts FROM tag WHERE creator_id = ? AND name = ?"#,
    )
    .bind(creator_id)
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.into())
}

fn username_conflict(e: sqlx::Error, username: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::DuplicateUsername(username.to_string())
        }
        _ => StoreError::Connection(e),
    }
}
