//! Core data models for notas.
//!
//! These types are shared across all notas crates and represent the core
//! domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note as stored and displayed.
///
/// `id == 0` means "not yet persisted": the store assigns the real id on the
/// first upsert. Every subsequent mutation is a read-modify-write copy keyed
/// by `id`.
///
/// Invariant: `trash_timestamp.is_some()` exactly when `is_in_trash` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub last_modified: DateTime<Utc>,
    pub is_pinned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub is_in_trash: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trash_timestamp: Option<DateTime<Utc>>,
    /// Attachment file paths, insertion order preserved.
    #[serde(default)]
    pub attachments: Vec<String>,
    /// Display color (e.g. `"#FFCDD2"`). `None` means default surface.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_hex: Option<String>,
}

impl Note {
    /// Create a new unpersisted note with the given title and content.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            content: content.into(),
            last_modified: Utc::now(),
            is_pinned: false,
            category: None,
            is_in_trash: false,
            trash_timestamp: None,
            attachments: Vec::new(),
            color_hex: None,
        }
    }

    /// Whether the store has assigned this note an id yet.
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// Copy with trash state set, stamped at `now`.
    pub fn into_trashed(self, now: DateTime<Utc>) -> Self {
        Self {
            is_in_trash: true,
            trash_timestamp: Some(now),
            ..self
        }
    }

    /// Copy with trash state cleared.
    pub fn into_restored(self) -> Self {
        Self {
            is_in_trash: false,
            trash_timestamp: None,
            ..self
        }
    }

    /// Copy with the pin flag flipped.
    pub fn with_pin_toggled(self) -> Self {
        Self {
            is_pinned: !self.is_pinned,
            ..self
        }
    }

    /// Copy with a new color (or cleared with `None`).
    pub fn with_color(self, color_hex: Option<String>) -> Self {
        Self { color_hex, ..self }
    }

    /// Case-insensitive substring match against title or content.
    ///
    /// This is the one matching rule used everywhere: the in-memory search
    /// filter and tests both go through it so the SQL LIKE path and the
    /// visibility pipeline cannot drift apart.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle)
    }
}
