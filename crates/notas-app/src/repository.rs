//! Domain transitions over the note store.
//!
//! The store knows rows; this layer knows the rules — timestamps on save,
//! trash bookkeeping, pin flips. Every transition takes a full note value
//! and writes a copy, keyed by id.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use notas_core::{Error, Note, NoteStore, Result};

/// Encodes domain operations as store mutations.
#[derive(Clone)]
pub struct NoteRepository {
    store: Arc<dyn NoteStore>,
}

impl NoteRepository {
    /// Create a repository over any note store.
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    /// Save an edited note: stamp `last_modified` and upsert.
    ///
    /// The caller merges its edits (title, content, color) into a full note
    /// value, preserving unrelated fields from the last-known value.
    /// Returns the note with its store-assigned id.
    pub async fn save(&self, note: Note) -> Result<Note> {
        let stamped = Note {
            last_modified: Utc::now(),
            ..note
        };
        let id = self.store.upsert(&stamped).await?;
        Ok(Note { id, ..stamped })
    }

    /// Move a note to the trash, stamping the trash time.
    pub async fn move_to_trash(&self, note: Note) -> Result<Note> {
        let trashed = note.into_trashed(Utc::now());
        let id = self.store.upsert(&trashed).await?;
        Ok(Note { id, ..trashed })
    }

    /// Restore a note from the trash.
    pub async fn restore(&self, note: Note) -> Result<Note> {
        let restored = note.into_restored();
        let id = self.store.upsert(&restored).await?;
        Ok(Note { id, ..restored })
    }

    /// Permanently delete a note.
    ///
    /// Attachment files are NOT removed; `remove_attachment` them first if
    /// physical cleanup is wanted.
    pub async fn delete_permanently(&self, note: &Note) -> Result<()> {
        self.store.delete(note.id).await
    }

    /// Flip a note's pin flag.
    pub async fn toggle_pin(&self, note: Note) -> Result<Note> {
        let toggled = note.with_pin_toggled();
        let id = self.store.upsert(&toggled).await?;
        Ok(Note { id, ..toggled })
    }

    /// Set or clear a note's color by id.
    pub async fn set_color(&self, id: i64, color_hex: Option<String>) -> Result<Note> {
        let note = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(Error::NoteNotFound(id))?;
        let colored = note.with_color(color_hex);
        self.store.upsert(&colored).await?;
        Ok(colored)
    }

    /// Permanently delete every trashed note. Returns how many were removed.
    pub async fn empty_trash(&self) -> Result<u64> {
        let trashed = self.store.list_trashed().await?;
        let count = trashed.len() as u64;
        for note in &trashed {
            self.store.delete(note.id).await?;
        }
        debug!(
            subsystem = "repository",
            op = "empty_trash",
            result_count = count,
            "Trash emptied"
        );
        Ok(count)
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn NoteStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notas_db::test_fixtures::TestDatabase;

    fn repository(test_db: &TestDatabase) -> NoteRepository {
        NoteRepository::new(Arc::new(test_db.db.notes.clone()))
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_stamps_modified() {
        let test_db = TestDatabase::new().await;
        let repo = repository(&test_db);

        let before = Utc::now();
        let saved = repo.save(Note::new("a", "b")).await.unwrap();
        assert!(saved.is_persisted());
        assert!(saved.last_modified >= before);
    }

    #[tokio::test]
    async fn test_move_to_trash_then_lists() {
        let test_db = TestDatabase::new().await;
        let repo = repository(&test_db);
        let store = repo.store().clone();

        let saved = repo.save(Note::new("doomed", "")).await.unwrap();
        let trashed = repo.move_to_trash(saved).await.unwrap();
        assert!(trashed.is_in_trash);
        assert!(trashed.trash_timestamp.is_some());

        assert!(store.list_active().await.unwrap().is_empty());
        let in_trash = store.list_trashed().await.unwrap();
        assert_eq!(in_trash.len(), 1);
        assert!(in_trash[0].trash_timestamp.is_some());
    }

    #[tokio::test]
    async fn test_restore_clears_trash_state() {
        let test_db = TestDatabase::new().await;
        let repo = repository(&test_db);

        let saved = repo.save(Note::new("back", "")).await.unwrap();
        let trashed = repo.move_to_trash(saved).await.unwrap();
        let restored = repo.restore(trashed).await.unwrap();

        assert!(!restored.is_in_trash);
        assert!(restored.trash_timestamp.is_none());
        assert_eq!(repo.store().list_active().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_pin_twice_restores_original() {
        let test_db = TestDatabase::new().await;
        let repo = repository(&test_db);

        let saved = repo.save(Note::new("a", "")).await.unwrap();
        let original = saved.is_pinned;
        let once = repo.toggle_pin(saved).await.unwrap();
        assert_ne!(once.is_pinned, original);
        let twice = repo.toggle_pin(once).await.unwrap();
        assert_eq!(twice.is_pinned, original);
    }

    #[tokio::test]
    async fn test_set_color_and_clear() {
        let test_db = TestDatabase::new().await;
        let repo = repository(&test_db);

        let saved = repo.save(Note::new("a", "")).await.unwrap();
        let colored = repo
            .set_color(saved.id, Some("#FFCDD2".to_string()))
            .await
            .unwrap();
        assert_eq!(colored.color_hex.as_deref(), Some("#FFCDD2"));

        let cleared = repo.set_color(saved.id, None).await.unwrap();
        assert!(cleared.color_hex.is_none());
    }

    #[tokio::test]
    async fn test_set_color_unknown_id() {
        let test_db = TestDatabase::new().await;
        let err = repository(&test_db).set_color(404, None).await.unwrap_err();
        assert!(matches!(err, Error::NoteNotFound(404)));
    }

    #[tokio::test]
    async fn test_delete_permanently_removes_row() {
        let test_db = TestDatabase::new().await;
        let repo = repository(&test_db);

        let saved = repo.save(Note::new("gone", "")).await.unwrap();
        repo.delete_permanently(&saved).await.unwrap();
        assert!(repo.store().get_by_id(saved.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_trash_spares_active_notes() {
        let test_db = TestDatabase::new().await;
        let repo = repository(&test_db);

        let keep = repo.save(Note::new("keep", "")).await.unwrap();
        let toss1 = repo.save(Note::new("toss1", "")).await.unwrap();
        let toss2 = repo.save(Note::new("toss2", "")).await.unwrap();
        repo.move_to_trash(toss1).await.unwrap();
        repo.move_to_trash(toss2).await.unwrap();

        assert_eq!(repo.empty_trash().await.unwrap(), 2);
        assert!(repo.store().list_trashed().await.unwrap().is_empty());
        assert_eq!(
            repo.store().get_by_id(keep.id).await.unwrap().unwrap().title,
            "keep"
        );
    }
}
