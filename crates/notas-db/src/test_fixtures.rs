//! Test fixtures for database tests.
//!
//! Provides a throwaway in-memory database per test plus small builders for
//! seeding notes, so tests stay short and consistent across the codebase.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use notas_db::test_fixtures::TestDatabase;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let test_db = TestDatabase::new().await;
//!     let id = test_db.seed_note("Title", "content").await;
//!     // Run your tests...
//! }
//! ```

use chrono::{TimeZone, Utc};

use notas_core::{Note, NoteStore};

use crate::{Database, PoolConfig};

/// An isolated in-memory database. Each instance is a fresh database;
/// dropping it drops the data.
pub struct TestDatabase {
    pub db: Database,
}

impl TestDatabase {
    /// Create a new in-memory test database with the schema applied.
    pub async fn new() -> Self {
        let db = Database::connect_with_config("sqlite::memory:", PoolConfig::in_memory())
            .await
            .expect("Failed to create in-memory test database");
        Self { db }
    }

    /// Insert a plain active note and return its id.
    pub async fn seed_note(&self, title: &str, content: &str) -> i64 {
        self.db
            .notes
            .upsert(&Note::new(title, content))
            .await
            .expect("Failed to seed note")
    }

    /// Insert a note with an explicit last-modified second and pin flag.
    pub async fn seed_note_at(&self, title: &str, modified_secs: i64, pinned: bool) -> i64 {
        let note = Note {
            last_modified: Utc.timestamp_opt(modified_secs, 0).unwrap(),
            is_pinned: pinned,
            ..Note::new(title, "")
        };
        self.db
            .notes
            .upsert(&note)
            .await
            .expect("Failed to seed note")
    }
}
