//! Attachment manager: bridges picked files into stored attachment paths.
//!
//! A file is copied into the app-scoped attachments directory under a
//! unique per-call name, then recorded on the note. The two steps are kept
//! all-or-nothing: a failed copy records nothing, and a failed record
//! removes the copied file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use notas_core::{AttachmentEdit, Error, NoteStore, Result};

/// Copies files into private storage and maintains notes' attachment lists.
#[derive(Clone)]
pub struct AttachmentManager {
    store: Arc<dyn NoteStore>,
    attachments_dir: PathBuf,
}

impl AttachmentManager {
    /// Create a manager writing into the given directory.
    pub fn new(store: Arc<dyn NoteStore>, attachments_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            attachments_dir: attachments_dir.into(),
        }
    }

    /// The directory attachment files are copied into.
    pub fn attachments_dir(&self) -> &Path {
        &self.attachments_dir
    }

    /// Unique destination name for one attachment copy, keeping the source
    /// extension so viewers can still infer the type.
    fn destination_for(&self, source: &Path) -> PathBuf {
        let name = match source.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", Uuid::now_v7(), ext),
            None => Uuid::now_v7().to_string(),
        };
        self.attachments_dir.join(name)
    }

    /// Copy `source` into private storage and record it on the note.
    ///
    /// Fails with `Error::NoteNotFound` if no note exists for `note_id` —
    /// an unsaved note cannot receive an attachment; persist it first.
    /// Fails with `Error::Io` if the copy fails; the note is not touched
    /// and no partial file is left behind. Returns the recorded path.
    pub async fn add_attachment(&self, note_id: i64, source: &Path) -> Result<String> {
        // Reject unknown notes before any file lands on disk.
        self.store
            .get_by_id(note_id)
            .await?
            .ok_or(Error::NoteNotFound(note_id))?;

        fs::create_dir_all(&self.attachments_dir).await?;
        let dest = self.destination_for(source);

        // Copy to a temp name, then rename: readers of the final path never
        // see a half-written file.
        let temp = dest.with_extension("tmp");
        let size_bytes = match fs::copy(source, &temp).await {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&temp).await;
                return Err(Error::Io(e));
            }
        };
        if let Err(e) = fs::rename(&temp, &dest).await {
            let _ = fs::remove_file(&temp).await;
            return Err(Error::Io(e));
        }

        let path = dest.to_string_lossy().into_owned();
        match self
            .store
            .update_attachments(note_id, AttachmentEdit::Append(path.clone()))
            .await
        {
            Ok(_) => {
                debug!(
                    subsystem = "attachments",
                    component = "manager",
                    op = "add_attachment",
                    note_id,
                    file_path = %path,
                    size_bytes,
                    "Attachment added"
                );
                Ok(path)
            }
            Err(e) => {
                // Recording failed; take the orphaned copy back out.
                let _ = fs::remove_file(&dest).await;
                Err(e)
            }
        }
    }

    /// Remove `path` from the note's attachment list, then best-effort
    /// delete the file.
    ///
    /// Fails with `Error::NoteNotFound` if the note doesn't exist. A
    /// file-deletion failure is logged, not surfaced — the reference is
    /// gone either way.
    pub async fn remove_attachment(&self, note_id: i64, path: &str) -> Result<()> {
        self.store
            .update_attachments(note_id, AttachmentEdit::Remove(path.to_string()))
            .await?;

        if let Err(e) = fs::remove_file(path).await {
            warn!(
                subsystem = "attachments",
                component = "manager",
                op = "remove_attachment",
                note_id,
                file_path = %path,
                error = %e,
                "Attachment file could not be deleted"
            );
        } else {
            debug!(
                subsystem = "attachments",
                component = "manager",
                op = "remove_attachment",
                note_id,
                file_path = %path,
                "Attachment removed"
            );
        }
        Ok(())
    }
}
