//! Embedded schema and migration runner.

use sqlx::sqlite::SqlitePool;

use crate::error::{StoreError, StoreResult};

/// Embedded migration SQL for the schema (001_schema.sql).
pub const SCHEMA_MIGRATION: &str = include_str!("../../../migrations/001_schema.sql");

/// Run the embedded migration.
///
/// Every statement is `IF NOT EXISTS`, so running it again on an
/// initialised database is a no-op.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    tracing::info!("Running database migrations...");

    sqlx::raw_sql(SCHEMA_MIGRATION)
        .execute(pool)
        .await
        .map_err(|e| StoreError::MigrationError(format!("Schema migration failed: {}", e)))?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}

/// Check if the schema has been initialized.
///
/// Returns true if the `memo` table exists.
pub async fn is_schema_initialized(pool: &SqlitePool) -> StoreResult<bool> {
    let result: (i64,) = sqlx::query_as(
        r#"SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'memo'"#,
    )
    .fetch_one(pool)
    .await?;

    Ok(result.0 > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_migration_embedded() {
        for table in [
            "user",
            "user_setting",
            "memo",
            "tag",
            "memo_tag",
            "resource",
            "memo_resource",
            "workspace_setting",
        ] {
            assert!(
                SCHEMA_MIGRATION.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)),
                "missing table {}",
                table
            );
        }
    }
}
