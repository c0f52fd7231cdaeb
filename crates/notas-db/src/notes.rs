//! Note store implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use notas_core::{AttachmentEdit, Error, EventBus, Note, NoteStore, Result, StoreEvent};

use crate::escape_like;

/// Column list shared by every SELECT, in `note_from_row` order.
const NOTE_COLUMNS: &str = "id, title, content, last_modified, is_pinned, category, \
                            is_in_trash, trash_timestamp, attachments, color_hex";

/// SQLite implementation of [`NoteStore`].
///
/// Every successful mutation broadcasts a [`StoreEvent`] on the shared bus;
/// the watch layer turns those into live query refreshes.
#[derive(Clone)]
pub struct SqliteNoteStore {
    pool: SqlitePool,
    bus: Arc<EventBus>,
}

impl SqliteNoteStore {
    /// Create a new SqliteNoteStore with the given connection pool and bus.
    pub fn new(pool: SqlitePool, bus: Arc<EventBus>) -> Self {
        Self { pool, bus }
    }

    /// The event bus this store emits on.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.bus
    }
}

/// Map a database row to a [`Note`].
///
/// The attachments column holds a JSON array; an empty string (pre-JSON
/// rows) decodes as an empty list rather than an error.
fn note_from_row(row: &SqliteRow) -> Result<Note> {
    let attachments_raw: String = row.try_get("attachments")?;
    let attachments: Vec<String> = if attachments_raw.trim().is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(&attachments_raw)?
    };

    Ok(Note {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        last_modified: row.try_get::<DateTime<Utc>, _>("last_modified")?,
        is_pinned: row.try_get("is_pinned")?,
        category: row.try_get("category")?,
        is_in_trash: row.try_get("is_in_trash")?,
        trash_timestamp: row.try_get::<Option<DateTime<Utc>>, _>("trash_timestamp")?,
        attachments,
        color_hex: row.try_get("color_hex")?,
    })
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn upsert(&self, note: &Note) -> Result<i64> {
        let attachments = serde_json::to_string(&note.attachments)?;

        let id = if note.id == 0 {
            let result = sqlx::query(
                r#"INSERT INTO note
                   (title, content, last_modified, is_pinned, category,
                    is_in_trash, trash_timestamp, attachments, color_hex)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
            )
            .bind(&note.title)
            .bind(&note.content)
            .bind(note.last_modified)
            .bind(note.is_pinned)
            .bind(&note.category)
            .bind(note.is_in_trash)
            .bind(note.trash_timestamp)
            .bind(&attachments)
            .bind(&note.color_hex)
            .execute(&self.pool)
            .await?;
            result.last_insert_rowid()
        } else {
            // Full-row replace keyed by id; replacement is the conflict policy.
            sqlx::query(
                r#"INSERT OR REPLACE INTO note
                   (id, title, content, last_modified, is_pinned, category,
                    is_in_trash, trash_timestamp, attachments, color_hex)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
            )
            .bind(note.id)
            .bind(&note.title)
            .bind(&note.content)
            .bind(note.last_modified)
            .bind(note.is_pinned)
            .bind(&note.category)
            .bind(note.is_in_trash)
            .bind(note.trash_timestamp)
            .bind(&attachments)
            .bind(&note.color_hex)
            .execute(&self.pool)
            .await?;
            note.id
        };

        debug!(
            subsystem = "db",
            component = "note_store",
            op = "upsert",
            note_id = id,
            "Note upserted"
        );
        self.bus.emit(StoreEvent::NoteUpserted { note_id: id });
        Ok(id)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM note WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        // Deleting an absent row is a no-op; only a real removal notifies.
        if result.rows_affected() > 0 {
            debug!(
                subsystem = "db",
                component = "note_store",
                op = "delete",
                note_id = id,
                "Note deleted"
            );
            self.bus.emit(StoreEvent::NoteDeleted { note_id: id });
        }
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Note>> {
        let row = sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM note WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(note_from_row).transpose()
    }

    async fn list_active(&self) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM note \
             WHERE is_in_trash = 0 \
             ORDER BY is_pinned DESC, last_modified DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(note_from_row).collect()
    }

    async fn list_trashed(&self) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM note \
             WHERE is_in_trash = 1 \
             ORDER BY trash_timestamp DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(note_from_row).collect()
    }

    async fn search(&self, pattern: &str) -> Result<Vec<Note>> {
        let like = format!("%{}%", escape_like(&pattern.to_lowercase()));
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM note \
             WHERE is_in_trash = 0 \
               AND (LOWER(title) LIKE ?1 ESCAPE '\\' \
                    OR LOWER(content) LIKE ?1 ESCAPE '\\') \
             ORDER BY is_pinned DESC, last_modified DESC"
        ))
        .bind(&like)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            subsystem = "db",
            component = "note_store",
            op = "search",
            query = pattern,
            result_count = rows.len(),
            "Search executed"
        );
        rows.iter().map(note_from_row).collect()
    }

    async fn update_attachments(&self, id: i64, edit: AttachmentEdit) -> Result<Note> {
        // Read and write inside one transaction: a concurrent save of the
        // same note cannot land between them and lose the attachment edit.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM note WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let note = match row {
            Some(ref row) => note_from_row(row)?,
            None => return Err(Error::NoteNotFound(id)),
        };

        let attachments = edit.apply(note.attachments);
        let encoded = serde_json::to_string(&attachments)?;
        sqlx::query("UPDATE note SET attachments = ?1 WHERE id = ?2")
            .bind(&encoded)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(
            subsystem = "db",
            component = "note_store",
            op = "update_attachments",
            note_id = id,
            result_count = attachments.len(),
            "Attachment list updated"
        );
        self.bus.emit(StoreEvent::NoteUpserted { note_id: id });
        Ok(Note { attachments, ..note })
    }
}
