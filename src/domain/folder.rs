use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel parent id meaning "root of the user's tree".
pub const ROOT_FOLDER_ID: i64 = 0;

/// A folder row. `path` is materialized (`parent.path + "/" + name`) so
/// subtree moves and prefix search avoid walking the `parent_id` chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    pub user_id: i64,
    pub parent_id: i64,
    pub name: String,
    pub path: String,
    pub status: FolderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderStatus {
    Active,
    Deleted,
}

impl Folder {
    pub fn is_active(&self) -> bool {
        matches!(self.status, FolderStatus::Active)
    }

    /// The path a folder named `name` would get under this folder.
    pub fn child_path(&self, name: &str) -> String {
        if self.id == ROOT_FOLDER_ID {
            format!("/{name}")
        } else {
            format!("{}/{name}", self.path)
        }
    }
}
