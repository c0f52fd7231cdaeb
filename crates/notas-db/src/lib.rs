//! # notas-db
//!
//! SQLite database layer for notas.
//!
//! This crate provides:
//! - Connection pool management
//! - The note store ([`SqliteNoteStore`]) with change notification
//! - Live query subscriptions over `tokio::sync::watch`
//! - The embedded single-table schema
//!
//! ## Example
//!
//! ```rust,ignore
//! use notas_db::Database;
//! use notas_core::{Note, NoteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite://notas.db").await?;
//!
//!     let id = db.notes.upsert(&Note::new("Groceries", "buy milk")).await?;
//!     let mut active = db.watch_active().await?;
//!     println!("visible notes: {}", active.borrow().len());
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub mod notes;
pub mod pool;
pub mod schema;
pub mod watch;

// Test fixtures are always compiled so downstream crates' tests can use them.
pub mod test_fixtures;

// Re-export core types
pub use notas_core::*;

pub use notes::SqliteNoteStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use schema::init_schema;
pub use watch::{watch_active, watch_note, watch_trashed};

/// Escape LIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context: the pool, the note store, and the event bus
/// that live queries refresh from.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::SqlitePool,
    /// Note store for CRUD operations.
    pub notes: SqliteNoteStore,
    bus: Arc<EventBus>,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    ///
    /// The schema is not applied here; use [`Database::connect`] or call
    /// [`init_schema`] yourself.
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        let bus = Arc::new(EventBus::default());
        Self {
            notes: SqliteNoteStore::new(pool.clone(), bus.clone()),
            bus,
            pool,
        }
    }

    /// Connect to the given URL and apply the schema.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(url, PoolConfig::default()).await
    }

    /// Connect with custom pool configuration and apply the schema.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        init_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    /// The store-change event bus.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Live view of all active notes.
    pub async fn watch_active(&self) -> Result<tokio::sync::watch::Receiver<Vec<Note>>> {
        watch::watch_active(self.notes.clone()).await
    }

    /// Live view of all trashed notes.
    pub async fn watch_trashed(&self) -> Result<tokio::sync::watch::Receiver<Vec<Note>>> {
        watch::watch_trashed(self.notes.clone()).await
    }

    /// Live view of a single note by id.
    pub async fn watch_note(
        &self,
        id: i64,
    ) -> Result<tokio::sync::watch::Receiver<Option<Note>>> {
        watch::watch_note(self.notes.clone(), id).await
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }
}
