//! Runtime configuration for the forum core.
//!
//! # Responsibility
//! - Hold database, logging and validation settings in one serde shape.
//! - Provide compiled defaults for every field so partial JSON loads.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::{default_log_level, init_logging};
use crate::validation::field::LengthBounds;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Field limits enforced by the validation pipeline. Lengths are counted in
/// characters after sanitization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub topic_title_min: usize,
    pub topic_title_max: usize,
    pub topic_content_max: usize,
    pub comment_content_max: usize,
    /// Applies to section, user and node names.
    pub name_max: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            topic_title_min: 5,
            topic_title_max: 100,
            topic_content_max: 20_000,
            comment_content_max: 5_000,
            name_max: 50,
        }
    }
}

impl ValidationLimits {
    pub fn topic_title(&self) -> LengthBounds {
        LengthBounds::new(self.topic_title_min, self.topic_title_max)
    }

    pub fn topic_content(&self) -> LengthBounds {
        LengthBounds::required(self.topic_content_max)
    }

    pub fn comment_content(&self) -> LengthBounds {
        LengthBounds::required(self.comment_content_max)
    }

    pub fn name(&self) -> LengthBounds {
        LengthBounds::required(self.name_max)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumConfig {
    /// SQLite file; `None` opens a private in-memory database.
    pub database_path: Option<PathBuf>,
    /// `trace|debug|info|warn|error`; build-mode default when unset.
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<String>,
    pub limits: ValidationLimits,
}

impl ForumConfig {
    /// Parses configuration JSON. Missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Starts file logging when `log_dir` is configured.
    pub fn init_logging(&self) -> Result<bool, String> {
        let Some(log_dir) = self.log_dir.as_deref() else {
            return Ok(false);
        };
        let level = self.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
        Ok(true)
    }

    /// Opens the configured database with migrations applied.
    pub fn open_db(&self) -> DbResult<Connection> {
        match &self.database_path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ForumConfig, ValidationLimits};

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            ForumConfig::from_json_str(r#"{"limits": {"topic_title_max": 80}}"#).unwrap();
        assert_eq!(config.limits.topic_title_max, 80);
        assert_eq!(
            config.limits.topic_title_min,
            ValidationLimits::default().topic_title_min
        );
        assert!(config.database_path.is_none());
    }

    #[test]
    fn logging_stays_off_without_directory() {
        let config = ForumConfig::default();
        assert_eq!(config.init_logging(), Ok(false));
    }

    #[test]
    fn unset_database_path_opens_memory_db() {
        let conn = ForumConfig::default().open_db().unwrap();
        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, crate::db::migrations::latest_version());
    }
}
