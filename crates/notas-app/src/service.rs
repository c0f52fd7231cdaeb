//! The UI-facing service facade.
//!
//! One handle owning the database, the domain repository, the visibility
//! pipeline, and the attachment manager. Screens read the live values and
//! call the mutating entry points; the `spawn_*` variants are
//! fire-and-forget — they dispatch to a background task and log failures
//! instead of surfacing them, so no screen ever blocks on a write.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::error;

use notas_core::{Note, NoteStore, Result};
use notas_db::Database;

use crate::attachments::AttachmentManager;
use crate::config::AppConfig;
use crate::repository::NoteRepository;
use crate::visibility::VisibilityPipeline;

/// Application service over one local note database.
#[derive(Clone)]
pub struct NoteService {
    db: Arc<Database>,
    repository: NoteRepository,
    attachments: AttachmentManager,
    pipeline: VisibilityPipeline,
    trashed_rx: watch::Receiver<Vec<Note>>,
}

impl NoteService {
    /// Open the service from configuration, creating directories and the
    /// database as needed.
    pub async fn open(config: AppConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&config.data_dir).await?;
        tokio::fs::create_dir_all(&config.attachments_dir).await?;
        let db = Database::connect(&config.database_url).await?;
        Self::with_database(db, config.attachments_dir).await
    }

    /// Build the service over an already-connected database.
    pub async fn with_database(
        db: Database,
        attachments_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let store: Arc<dyn NoteStore> = Arc::new(db.notes.clone());
        let repository = NoteRepository::new(store.clone());
        let attachments = AttachmentManager::new(store, attachments_dir);
        let pipeline = VisibilityPipeline::new(db.watch_active().await?);
        let trashed_rx = db.watch_trashed().await?;

        Ok(Self {
            db: Arc::new(db),
            repository,
            attachments,
            pipeline,
            trashed_rx,
        })
    }

    // ── Live values ────────────────────────────────────────────────────

    /// Live list of visible notes: active notes filtered by the current
    /// search query, pinned first, then most recently modified.
    pub fn visible_notes(&self) -> watch::Receiver<Vec<Note>> {
        self.pipeline.visible()
    }

    /// Live list of trashed notes, most recently trashed first.
    pub fn trashed_notes(&self) -> watch::Receiver<Vec<Note>> {
        self.trashed_rx.clone()
    }

    /// The current search query.
    pub fn search_query(&self) -> String {
        self.pipeline.query()
    }

    /// Live view of the search query.
    pub fn watch_search_query(&self) -> watch::Receiver<String> {
        self.pipeline.watch_query()
    }

    /// Replace the search query; the visible list re-filters immediately.
    pub fn set_search_query(&self, query: impl Into<String>) {
        self.pipeline.set_query(query);
    }

    /// Live lookup of one note by id; `None` once deleted.
    pub async fn watch_note(&self, id: i64) -> Result<watch::Receiver<Option<Note>>> {
        self.db.watch_note(id).await
    }

    // ── Mutations ──────────────────────────────────────────────────────

    /// Save an edited note (stamps `last_modified`).
    pub async fn save(&self, note: Note) -> Result<Note> {
        self.repository.save(note).await
    }

    /// Move a note to the trash.
    pub async fn move_to_trash(&self, note: Note) -> Result<Note> {
        self.repository.move_to_trash(note).await
    }

    /// Restore a note from the trash.
    pub async fn restore(&self, note: Note) -> Result<Note> {
        self.repository.restore(note).await
    }

    /// Permanently delete a note.
    pub async fn delete_permanently(&self, note: &Note) -> Result<()> {
        self.repository.delete_permanently(note).await
    }

    /// Flip a note's pin flag.
    pub async fn toggle_pin(&self, note: Note) -> Result<Note> {
        self.repository.toggle_pin(note).await
    }

    /// Set or clear a note's color.
    pub async fn set_color(&self, id: i64, color_hex: Option<String>) -> Result<Note> {
        self.repository.set_color(id, color_hex).await
    }

    /// Permanently delete every trashed note.
    pub async fn empty_trash(&self) -> Result<u64> {
        self.repository.empty_trash().await
    }

    /// Copy a file into private storage and attach it to a note.
    pub async fn add_attachment(&self, note_id: i64, source: &Path) -> Result<String> {
        self.attachments.add_attachment(note_id, source).await
    }

    /// Detach a file from a note and best-effort delete it.
    pub async fn remove_attachment(&self, note_id: i64, path: &str) -> Result<()> {
        self.attachments.remove_attachment(note_id, path).await
    }

    // ── Fire-and-forget variants ───────────────────────────────────────
    //
    // Failures are logged, never surfaced; the live values reflect
    // whatever actually happened.

    /// Save in the background.
    pub fn spawn_save(&self, note: Note) {
        let repository = self.repository.clone();
        tokio::spawn(async move {
            if let Err(e) = repository.save(note).await {
                error!(subsystem = "service", op = "save", error = %e, "Background save failed");
            }
        });
    }

    /// Trash in the background.
    pub fn spawn_move_to_trash(&self, note: Note) {
        let repository = self.repository.clone();
        tokio::spawn(async move {
            if let Err(e) = repository.move_to_trash(note).await {
                error!(subsystem = "service", op = "move_to_trash", error = %e, "Background trash failed");
            }
        });
    }

    /// Restore in the background.
    pub fn spawn_restore(&self, note: Note) {
        let repository = self.repository.clone();
        tokio::spawn(async move {
            if let Err(e) = repository.restore(note).await {
                error!(subsystem = "service", op = "restore", error = %e, "Background restore failed");
            }
        });
    }

    /// Permanently delete in the background.
    pub fn spawn_delete_permanently(&self, note: Note) {
        let repository = self.repository.clone();
        tokio::spawn(async move {
            if let Err(e) = repository.delete_permanently(&note).await {
                error!(subsystem = "service", op = "delete_permanently", error = %e, "Background delete failed");
            }
        });
    }

    /// Toggle a pin in the background.
    pub fn spawn_toggle_pin(&self, note: Note) {
        let repository = self.repository.clone();
        tokio::spawn(async move {
            if let Err(e) = repository.toggle_pin(note).await {
                error!(subsystem = "service", op = "toggle_pin", error = %e, "Background pin toggle failed");
            }
        });
    }

    /// Attach a file in the background.
    pub fn spawn_add_attachment(&self, note_id: i64, source: PathBuf) {
        let attachments = self.attachments.clone();
        tokio::spawn(async move {
            if let Err(e) = attachments.add_attachment(note_id, &source).await {
                error!(
                    subsystem = "service",
                    op = "add_attachment",
                    note_id,
                    error = %e,
                    "Background attachment add failed"
                );
            }
        });
    }

    /// Detach a file in the background.
    pub fn spawn_remove_attachment(&self, note_id: i64, path: String) {
        let attachments = self.attachments.clone();
        tokio::spawn(async move {
            if let Err(e) = attachments.remove_attachment(note_id, &path).await {
                error!(
                    subsystem = "service",
                    op = "remove_attachment",
                    note_id,
                    error = %e,
                    "Background attachment remove failed"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notas_db::PoolConfig;
    use std::time::Duration;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    async fn service(dir: &Path) -> NoteService {
        let db = Database::connect_with_config("sqlite::memory:", PoolConfig::in_memory())
            .await
            .unwrap();
        NoteService::with_database(db, dir.join("attachments"))
            .await
            .unwrap()
    }

    async fn wait_until<T: Clone>(
        rx: &mut watch::Receiver<T>,
        mut pred: impl FnMut(&T) -> bool,
    ) -> T {
        let deadline = tokio::time::Instant::now() + WAIT;
        loop {
            if pred(&rx.borrow()) {
                return rx.borrow().clone();
            }
            let remaining = deadline
                .checked_duration_since(tokio::time::Instant::now())
                .expect("live value never reached expected state");
            timeout(remaining, rx.changed()).await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn test_save_shows_up_in_visible_notes() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path()).await;
        let mut visible = service.visible_notes();

        service.save(Note::new("hello", "world")).await.unwrap();
        let notes = wait_until(&mut visible, |n| n.len() == 1).await;
        assert_eq!(notes[0].title, "hello");
    }

    #[tokio::test]
    async fn test_trash_flow_moves_between_live_lists() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path()).await;
        let mut visible = service.visible_notes();
        let mut trashed = service.trashed_notes();

        let note = service.save(Note::new("doomed", "")).await.unwrap();
        wait_until(&mut visible, |n| n.len() == 1).await;

        let note = service.move_to_trash(note).await.unwrap();
        wait_until(&mut visible, |n| n.is_empty()).await;
        wait_until(&mut trashed, |n| n.len() == 1).await;

        service.restore(note).await.unwrap();
        wait_until(&mut visible, |n| n.len() == 1).await;
        wait_until(&mut trashed, |n| n.is_empty()).await;
    }

    #[tokio::test]
    async fn test_search_query_narrows_visible_notes() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path()).await;
        let mut visible = service.visible_notes();

        service.save(Note::new("Grocery List", "buy milk")).await.unwrap();
        service.save(Note::new("Meeting notes", "standup")).await.unwrap();
        wait_until(&mut visible, |n| n.len() == 2).await;

        service.set_search_query("grocery");
        assert_eq!(service.search_query(), "grocery");
        let notes = wait_until(&mut visible, |n| n.len() == 1).await;
        assert_eq!(notes[0].title, "Grocery List");
    }

    #[tokio::test]
    async fn test_spawn_save_eventually_lands() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path()).await;
        let mut visible = service.visible_notes();

        service.spawn_save(Note::new("async", ""));
        let notes = wait_until(&mut visible, |n| n.len() == 1).await;
        assert_eq!(notes[0].title, "async");
    }

    #[tokio::test]
    async fn test_attachment_through_service() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path()).await;

        let source = dir.path().join("doc.pdf");
        std::fs::write(&source, b"pdf bytes").unwrap();

        let note = service.save(Note::new("with file", "")).await.unwrap();
        let path = service.add_attachment(note.id, &source).await.unwrap();
        assert!(Path::new(&path).exists());

        service.remove_attachment(note.id, &path).await.unwrap();
        assert!(!Path::new(&path).exists());
    }

    #[tokio::test]
    async fn test_empty_trash_through_service() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path()).await;
        let mut trashed = service.trashed_notes();

        let a = service.save(Note::new("a", "")).await.unwrap();
        let b = service.save(Note::new("b", "")).await.unwrap();
        service.move_to_trash(a).await.unwrap();
        service.move_to_trash(b).await.unwrap();
        wait_until(&mut trashed, |n| n.len() == 2).await;

        assert_eq!(service.empty_trash().await.unwrap(), 2);
        wait_until(&mut trashed, |n| n.is_empty()).await;
    }

    #[tokio::test]
    async fn test_watch_note_follows_edits() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path()).await;

        let note = service.save(Note::new("v1", "")).await.unwrap();
        let mut rx = service.watch_note(note.id).await.unwrap();
        assert_eq!(rx.borrow().as_ref().unwrap().title, "v1");

        let mut edited = note.clone();
        edited.title = "v2".to_string();
        service.save(edited).await.unwrap();
        wait_until(&mut rx, |n| {
            n.as_ref().map(|n| n.title.as_str()) == Some("v2")
        })
        .await;
    }
}
