//! Process configuration.
//!
//! `spec.md` treats config loading as an external collaborator, but the
//! crate still needs a typed settings object to construct its own
//! components. Follows the teacher's own pattern
//! (`core-new/src/config/app_config.rs`): a plain `serde`-deserializable
//! struct loaded from an optional file, with environment variables as
//! overrides — no external config-management crate.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default per-user quota capacity: 10 GiB.
pub const DEFAULT_QUOTA_CAPACITY: i64 = 10 * 1024 * 1024 * 1024;

/// Default number of download worker tasks.
pub const DEFAULT_DOWNLOAD_WORKERS: usize = 3;

/// Job cache key TTL (upload part tags, download tasks): 24 hours.
pub const JOB_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// SQLite/Postgres connection string for the catalog database.
    pub database_url: String,

    /// Redis connection string backing the job cache.
    pub redis_url: String,

    /// S3-compatible endpoint URL (None selects the SDK's default resolver).
    pub object_store_endpoint: Option<String>,

    /// Bucket that holds uploaded object bytes.
    pub object_store_bucket: String,

    /// Root directory for per-task download staging directories.
    pub staging_root: PathBuf,

    /// Fixed download worker pool size (spec.md §4.E, default W=3).
    pub download_workers: usize,

    /// Default per-user quota capacity in bytes.
    pub default_quota_capacity: i64,

    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://drivecore.db?mode=rwc".to_string(),
            redis_url: "redis://127.0.0.1/".to_string(),
            object_store_endpoint: None,
            object_store_bucket: "drivecore".to_string(),
            staging_root: std::env::temp_dir().join("drivecore").join("downloads"),
            download_workers: DEFAULT_DOWNLOAD_WORKERS,
            default_quota_capacity: DEFAULT_QUOTA_CAPACITY,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load configuration: start from defaults, overlay a TOML file named by
    /// `DRIVECORE_CONFIG` if present, then overlay individual `DRIVECORE_*`
    /// environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let mut settings = if let Ok(path) = std::env::var("DRIVECORE_CONFIG") {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("reading config file {path}: {e}"))?;
            toml::from_str(&raw)?
        } else {
            Self::default()
        };

        settings.apply_env_overrides();
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DRIVECORE_DATABASE_URL") {
            self.database_url = v;
        }
        if let Ok(v) = std::env::var("DRIVECORE_REDIS_URL") {
            self.redis_url = v;
        }
        if let Ok(v) = std::env::var("DRIVECORE_OBJECT_STORE_ENDPOINT") {
            self.object_store_endpoint = Some(v);
        }
        if let Ok(v) = std::env::var("DRIVECORE_OBJECT_STORE_BUCKET") {
            self.object_store_bucket = v;
        }
        if let Ok(v) = std::env::var("DRIVECORE_STAGING_ROOT") {
            self.staging_root = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("DRIVECORE_DOWNLOAD_WORKERS") {
            if let Ok(n) = v.parse() {
                self.download_workers = n;
            }
        }
        if let Ok(v) = std::env::var("DRIVECORE_LOG_LEVEL") {
            self.log_level = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let s = Settings::default();
        assert_eq!(s.download_workers, DEFAULT_DOWNLOAD_WORKERS);
        assert_eq!(s.default_quota_capacity, DEFAULT_QUOTA_CAPACITY);
        assert!(s.database_url.starts_with("sqlite://"));
    }
}
