//! Core traits for notas abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Note;

/// A single edit to a note's attachment list.
///
/// Attachment edits go through [`NoteStore::update_attachments`], which
/// applies the edit inside one transaction so a concurrent save of the same
/// note cannot lose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentEdit {
    /// Append a path to the end of the list.
    Append(String),
    /// Remove the first exact-match occurrence of a path.
    Remove(String),
}

impl AttachmentEdit {
    /// Apply this edit to an attachment list.
    pub fn apply(&self, mut attachments: Vec<String>) -> Vec<String> {
        match self {
            AttachmentEdit::Append(path) => {
                attachments.push(path.clone());
                attachments
            }
            AttachmentEdit::Remove(path) => {
                if let Some(pos) = attachments.iter().position(|p| p == path) {
                    attachments.remove(pos);
                }
                attachments
            }
        }
    }
}

/// Repository for note CRUD operations against the durable table.
///
/// "Live" views over these queries are provided by the watch layer, which
/// re-runs them on every store event; the trait itself is plain
/// request/response.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Insert the note when `id == 0`, otherwise replace the row with the
    /// matching id. Returns the note's id (freshly assigned on insert).
    async fn upsert(&self, note: &Note) -> Result<i64>;

    /// Remove the row by id. Deleting an absent row is a no-op.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Fetch a note by id.
    async fn get_by_id(&self, id: i64) -> Result<Option<Note>>;

    /// All non-trashed notes, pinned first, then most recently modified.
    async fn list_active(&self) -> Result<Vec<Note>>;

    /// All trashed notes, most recently trashed first.
    async fn list_trashed(&self) -> Result<Vec<Note>>;

    /// Active notes whose title or content contains `pattern` as a
    /// case-insensitive substring, in `list_active` order.
    async fn search(&self, pattern: &str) -> Result<Vec<Note>>;

    /// Apply an attachment edit to one note inside a single transaction.
    ///
    /// Returns the updated note. Fails with `Error::NoteNotFound` when no
    /// row matches.
    async fn update_attachments(&self, id: i64, edit: AttachmentEdit) -> Result<Note>;
}
