use async_trait::async_trait;
use uuid::Uuid;

use super::error::JobCacheError;
use crate::domain::{DownloadTask, UploadSession};

type Result<T> = std::result::Result<T, JobCacheError>;

/// 24 h TTL on task and upload-session keys, matching the original's
/// `pipe.Expire(ctx, taskKey, time.Hour*24)`.
pub const TASK_TTL_SECS: u64 = 24 * 60 * 60;

/// Atomic key-value operations backing the download task queue/state and
/// the upload part-tag tables. Mirrors `spec.md` §4.C; the original's
/// `cache/file.go` only implements the download-task half, the
/// upload-session half is this crate's generalization of the same
/// key-shape idiom to the multipart-upload side.
#[async_trait]
pub trait JobCache: Send + Sync {
    /// Stores the task and pushes its id onto the shared FIFO, both within
    /// one atomic unit (a Redis pipeline in the production driver).
    async fn enqueue_download_task(&self, task: &DownloadTask) -> Result<()>;

    /// Blocks until a task id is available, then pops it — `BRPOP`
    /// semantics, so the caller commits to handling exactly one task per
    /// successful return.
    async fn dequeue_download_task_blocking(&self) -> Result<Uuid>;

    async fn get_download_task(&self, task_id: Uuid) -> Result<DownloadTask>;

    async fn put_download_task(&self, task: &DownloadTask) -> Result<()>;

    async fn put_upload_session(&self, session: &UploadSession) -> Result<()>;

    async fn get_upload_session(&self, upload_id: &str) -> Result<UploadSession>;

    async fn delete_upload_session(&self, upload_id: &str) -> Result<()>;
}
