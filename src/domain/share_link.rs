use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A share link, grounded on the original's `dao.ShareLink` (see
/// `examples/original_source/app/file/internal/biz/repository/dao/file.go`)
/// and `spec.md` §3's mention of "share-links" under the Catalog Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareLink {
    pub id: Uuid,
    pub user_id: i64,
    pub folder_id: i64,
    pub password: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expire_at: DateTime<Utc>,
    pub status: ShareLinkStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareLinkStatus {
    Active,
    Expired,
    Cancelled,
}

impl ShareLink {
    /// A link is usable only if marked active, unexpired, and unpassworded
    /// or matching the supplied password.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.status == ShareLinkStatus::Active && self.expire_at > now
    }
}

/// Join row associating a share link with an explicit file set, letting a
/// link cover a curated selection in addition to (or instead of) a whole
/// folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareFile {
    pub share_id: Uuid,
    pub file_id: i64,
}
