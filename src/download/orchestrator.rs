use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::domain::{DownloadTask, DownloadTaskStatus, DownloadedFile, FileDownloadStatus};
use crate::error::{DriveError, DriveResult};
use crate::job_cache::JobCache;

/// One requested file in a batch download, naming where it should land
/// under the task's staging root.
pub struct DownloadRequest {
    pub file_id: i64,
    pub relative_path: String,
}

/// Builds `DownloadTask`s and enqueues them for the worker pool; also
/// answers status queries and resumes partially-completed tasks. Does not
/// itself move bytes — that's `download::worker`.
pub struct DownloadOrchestrator {
    catalog: Arc<CatalogStore>,
    job_cache: Arc<dyn JobCache>,
}

impl DownloadOrchestrator {
    pub fn new(catalog: Arc<CatalogStore>, job_cache: Arc<dyn JobCache>) -> Self {
        Self { catalog, job_cache }
    }

    /// Authorizes every requested file via `user_id` match (through
    /// `CatalogStore::get_file`), computes `total_size`, then enqueues a
    /// fresh `pending` task.
    pub async fn create_task(
        &self,
        user_id: i64,
        folder_name: &str,
        requests: Vec<DownloadRequest>,
    ) -> DriveResult<Uuid> {
        let mut files = Vec::with_capacity(requests.len());
        let mut total_size = 0i64;
        for request in requests {
            let file = self.catalog.get_file(request.file_id, user_id).await?;
            total_size += file.size;
            files.push(DownloadedFile {
                file_id: file.id,
                name: file.name,
                relative_path: request.relative_path,
                size: file.size,
                status: FileDownloadStatus::Pending,
                downloaded_bytes: 0,
            });
        }

        let now = Utc::now();
        let task = DownloadTask {
            id: Uuid::new_v4(),
            user_id,
            folder_name: folder_name.to_owned(),
            status: DownloadTaskStatus::Queued,
            total_size,
            downloaded_bytes: 0,
            created_at: now,
            updated_at: now,
            files,
        };

        self.job_cache.enqueue_download_task(&task).await?;
        Ok(task.id)
    }

    pub async fn get_task(&self, task_id: Uuid, user_id: i64) -> DriveResult<DownloadTask> {
        let task = self.job_cache.get_download_task(task_id).await?;
        if task.user_id != user_id {
            return Err(DriveError::PermissionDenied(format!(
                "task {task_id} does not belong to user {user_id}"
            )));
        }
        Ok(task)
    }

    /// Filters the original task's files down to `file_ids`, keeps each
    /// file's prior `downloaded_bytes` so the worker resumes by offset,
    /// and enqueues a brand new task id. The original task is left
    /// untouched.
    pub async fn resume(&self, task_id: Uuid, user_id: i64, file_ids: &[i64]) -> DriveResult<Uuid> {
        let original = self.get_task(task_id, user_id).await?;

        let files: Vec<DownloadedFile> = original
            .files
            .into_iter()
            .filter(|f| file_ids.contains(&f.file_id))
            .map(|mut f| {
                f.status = FileDownloadStatus::Pending;
                f
            })
            .collect();

        if files.is_empty() {
            return Err(DriveError::InvalidArgument(
                "no matching files to resume".into(),
            ));
        }

        let total_size: i64 = files.iter().map(|f| f.size - f.downloaded_bytes).sum();
        let now = Utc::now();
        let new_task = DownloadTask {
            id: Uuid::new_v4(),
            user_id,
            folder_name: original.folder_name,
            status: DownloadTaskStatus::Queued,
            total_size,
            downloaded_bytes: 0,
            created_at: now,
            updated_at: now,
            files,
        };

        self.job_cache.enqueue_download_task(&new_task).await?;
        Ok(new_task.id)
    }
}
