//! Embedded schema, applied at connect time.
//!
//! A single table holds every note. The attachment list is a JSON array in
//! a TEXT column; the store owns encode/decode, nothing else touches it.

use sqlx::SqlitePool;

use notas_core::Result;

/// Schema DDL. Idempotent, applied on every connect.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS note (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    title           TEXT NOT NULL,
    content         TEXT NOT NULL,
    last_modified   TEXT NOT NULL,
    is_pinned       INTEGER NOT NULL DEFAULT 0,
    category        TEXT,
    is_in_trash     INTEGER NOT NULL DEFAULT 0,
    trash_timestamp TEXT,
    attachments     TEXT NOT NULL DEFAULT '[]',
    color_hex       TEXT
);

CREATE INDEX IF NOT EXISTS idx_note_active
    ON note (is_in_trash, is_pinned DESC, last_modified DESC);

CREATE INDEX IF NOT EXISTS idx_note_trash
    ON note (is_in_trash, trash_timestamp DESC);
"#;

/// Apply the schema to the given pool.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!(
        subsystem = "db",
        component = "schema",
        op = "init",
        db_table = "note",
        "Schema applied"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{create_pool_with_config, PoolConfig};

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let pool = create_pool_with_config("sqlite::memory:", PoolConfig::in_memory())
            .await
            .unwrap();
        init_schema(&pool).await.unwrap();
        init_schema(&pool).await.unwrap();

        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM note")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.0, 0);
    }
}
