//! Application configuration.
//!
//! Environment variables (a `.env` file is honored):
//! - `NOTAS_DATA_DIR` — base directory for everything (default `./data`)
//! - `NOTAS_DATABASE_URL` — overrides the database location
//! - `NOTAS_ATTACHMENTS_DIR` — overrides the attachment directory

use std::path::{Path, PathBuf};

/// Resolved configuration for opening a [`crate::NoteService`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base data directory; created on open.
    pub data_dir: PathBuf,
    /// sqlx connection URL for the note database.
    pub database_url: String,
    /// Directory attachment files are copied into; created on open.
    pub attachments_dir: PathBuf,
}

impl AppConfig {
    /// Configuration with everything laid out under one data directory.
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            database_url: format!("sqlite://{}", data_dir.join("notas.db").display()),
            attachments_dir: data_dir.join("attachments"),
            data_dir,
        }
    }

    /// Read configuration from the environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let data_dir =
            std::env::var("NOTAS_DATA_DIR").unwrap_or_else(|_| "./data".to_string());
        let mut config = Self::for_data_dir(Path::new(&data_dir));

        if let Ok(url) = std::env::var("NOTAS_DATABASE_URL") {
            config.database_url = url;
        }
        if let Ok(dir) = std::env::var("NOTAS_ATTACHMENTS_DIR") {
            config.attachments_dir = PathBuf::from(dir);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_data_dir_lays_out_paths() {
        let config = AppConfig::for_data_dir("/tmp/notas-test");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/notas-test"));
        assert_eq!(config.database_url, "sqlite:///tmp/notas-test/notas.db");
        assert_eq!(
            config.attachments_dir,
            PathBuf::from("/tmp/notas-test/attachments")
        );
    }
}
