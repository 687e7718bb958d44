use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file row as the catalog sees it. Identity is `file_id`;
/// `(user_id, folder_id, name)` is unique among non-deleted rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub id: i64,
    pub user_id: i64,
    pub folder_id: i64,
    pub name: String,
    /// Hex-encoded content hash, used for the instant-upload dedup lookup.
    pub hash: String,
    pub mime_type: String,
    pub size: i64,
    /// Local staging path hint, if the bytes are mirrored on local disk.
    pub path_hint: Option<String>,
    pub status: FileStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Active,
    Deleted,
    Pending,
}

impl File {
    pub fn is_active(&self) -> bool {
        matches!(self.status, FileStatus::Active)
    }
}
