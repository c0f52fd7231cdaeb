//! # notas-app
//!
//! Application service layer for notas.
//!
//! This crate provides:
//! - [`NoteRepository`] — domain transitions (save, trash, restore, pin)
//! - [`VisibilityPipeline`] — search query × live active list → visible list
//! - [`AttachmentManager`] — file copies into app-scoped storage
//! - [`NoteService`] — the single UI-facing handle over all of the above
//!
//! ## Example
//!
//! ```rust,ignore
//! use notas_app::{AppConfig, NoteService};
//! use notas_core::Note;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     notas_app::init_tracing();
//!     let service = NoteService::open(AppConfig::from_env()).await?;
//!
//!     service.save(Note::new("Groceries", "buy milk")).await?;
//!     service.set_search_query("groceries");
//!     println!("visible: {}", service.visible_notes().borrow().len());
//!     Ok(())
//! }
//! ```

pub mod attachments;
pub mod config;
pub mod repository;
pub mod service;
pub mod visibility;

pub use attachments::AttachmentManager;
pub use config::AppConfig;
pub use repository::NoteRepository;
pub use service::NoteService;
pub use visibility::VisibilityPipeline;

// Re-export core types
pub use notas_core::{Error, Note, Result};

/// Initialize tracing for embedding applications.
///
/// Honors `RUST_LOG`; defaults to debug for the notas crates. Safe to call
/// more than once — later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notas_app=debug,notas_db=debug,notas_core=debug".into());

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
