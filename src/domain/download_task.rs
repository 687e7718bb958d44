use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A batch-download task queued in the job cache, grounded on the
/// `DownloadTask` JSON shape kept in Redis by the original's
/// `cache/file.go` (`download:task:<id>` hash, `download:queue` list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadTask {
    pub id: Uuid,
    pub user_id: i64,
    /// Name used for the zip/staging directory presented to the caller.
    pub folder_name: String,
    pub status: DownloadTaskStatus,
    pub total_size: i64,
    pub downloaded_bytes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub files: Vec<DownloadedFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadTaskStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl DownloadTaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DownloadTaskStatus::Completed | DownloadTaskStatus::Failed | DownloadTaskStatus::Cancelled
        )
    }
}

/// One file within a `DownloadTask`. `downloaded_bytes` is the resume
/// offset: a worker picking this up again seeks past it before writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadedFile {
    pub file_id: i64,
    pub name: String,
    pub relative_path: String,
    pub size: i64,
    pub status: FileDownloadStatus,
    pub downloaded_bytes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileDownloadStatus {
    Pending,
    Downloading,
    Done,
    Failed,
}

impl DownloadedFile {
    pub fn is_resumable(&self) -> bool {
        matches!(self.status, FileDownloadStatus::Failed | FileDownloadStatus::Pending)
            && self.downloaded_bytes < self.size
    }
}
