//! Batch download orchestration: task creation/resume plus the fixed
//! worker pool that drains the job cache's queue and streams objects to a
//! staging area.

mod orchestrator;
mod worker;

pub use orchestrator::{DownloadOrchestrator, DownloadRequest};
pub use worker::{DownloadWorkerPool, DEFAULT_WORKERS};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogStore;
    use crate::job_cache::MemoryJobCache;
    use crate::object_store::MemoryObjectAdapter;
    use bytes::Bytes;
    use std::sync::Arc;
    use std::time::Duration;

    async fn seeded_catalog() -> Arc<CatalogStore> {
        let store = CatalogStore::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store.create_file_store(1, 1_000_000).await.unwrap();
        store
            .create_file(1, 0, "a.txt", "hash-a", "text/plain", "users/1/a.txt", 5)
            .await
            .unwrap();
        store
            .create_file(1, 0, "b.txt", "hash-b", "text/plain", "users/1/b.txt", 10)
            .await
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn create_task_computes_total_size_and_enqueues() {
        let catalog = seeded_catalog().await;
        let job_cache: Arc<dyn crate::job_cache::JobCache> = Arc::new(MemoryJobCache::new());
        let orchestrator = DownloadOrchestrator::new(catalog.clone(), job_cache.clone());

        let task_id = orchestrator
            .create_task(
                1,
                "export",
                vec![DownloadRequest {
                    file_id: 1,
                    relative_path: "a.txt".into(),
                }],
            )
            .await
            .unwrap();

        let task = orchestrator.get_task(task_id, 1).await.unwrap();
        assert_eq!(task.total_size, 5);
        assert_eq!(task.files.len(), 1);
    }

    #[tokio::test]
    async fn get_task_rejects_wrong_user() {
        let catalog = seeded_catalog().await;
        let job_cache: Arc<dyn crate::job_cache::JobCache> = Arc::new(MemoryJobCache::new());
        let orchestrator = DownloadOrchestrator::new(catalog, job_cache);

        let task_id = orchestrator
            .create_task(
                1,
                "export",
                vec![DownloadRequest {
                    file_id: 1,
                    relative_path: "a.txt".into(),
                }],
            )
            .await
            .unwrap();

        let err = orchestrator.get_task(task_id, 99).await.unwrap_err();
        assert!(matches!(err, crate::error::DriveError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn worker_pool_downloads_enqueued_task_to_staging() {
        let catalog = seeded_catalog().await;
        let job_cache: Arc<dyn crate::job_cache::JobCache> = Arc::new(MemoryJobCache::new());
        let objects: Arc<dyn crate::object_store::ObjectAdapter> = Arc::new(MemoryObjectAdapter::new());
        objects.put("users/1/a.txt", Bytes::from_static(b"hello")).await.unwrap();

        let orchestrator = DownloadOrchestrator::new(catalog.clone(), job_cache.clone());
        let task_id = orchestrator
            .create_task(
                1,
                "export",
                vec![DownloadRequest {
                    file_id: 1,
                    relative_path: "a.txt".into(),
                }],
            )
            .await
            .unwrap();

        let staging = tempfile::tempdir().unwrap();
        let pool = DownloadWorkerPool::new(job_cache.clone(), objects, staging.path().to_path_buf(), 1);
        let handles = pool.spawn();

        tokio::time::sleep(Duration::from_millis(200)).await;
        pool.shutdown();
        for h in handles {
            let _ = tokio::time::timeout(Duration::from_millis(500), h).await;
        }

        let task = orchestrator.get_task(task_id, 1).await.unwrap();
        assert_eq!(task.status, crate::domain::DownloadTaskStatus::Completed);
        assert_eq!(task.downloaded_bytes, 5);
    }

    #[tokio::test]
    async fn resume_preserves_downloaded_bytes_and_leaves_original_task_untouched() {
        let catalog = seeded_catalog().await;
        let job_cache: Arc<dyn crate::job_cache::JobCache> = Arc::new(MemoryJobCache::new());
        let orchestrator = DownloadOrchestrator::new(catalog, job_cache.clone());

        let task_id = orchestrator
            .create_task(
                1,
                "export",
                vec![
                    DownloadRequest {
                        file_id: 1,
                        relative_path: "a.txt".into(),
                    },
                    DownloadRequest {
                        file_id: 2,
                        relative_path: "b.txt".into(),
                    },
                ],
            )
            .await
            .unwrap();

        // Simulate a worker having finished "a.txt" (5/5 bytes) and made no
        // progress on "b.txt" (0/10 bytes) before the task stalled.
        let mut original = job_cache.get_download_task(task_id).await.unwrap();
        original.files[0].downloaded_bytes = 5;
        original.files[0].status = crate::domain::FileDownloadStatus::Done;
        original.downloaded_bytes = 5;
        job_cache.put_download_task(&original).await.unwrap();

        let new_task_id = orchestrator.resume(task_id, 1, &[1i64, 2i64]).await.unwrap();
        assert_ne!(new_task_id, task_id);

        let resumed = orchestrator.get_task(new_task_id, 1).await.unwrap();
        assert_eq!(resumed.total_size, (5 - 5) + (10 - 0));
        let a = resumed.files.iter().find(|f| f.file_id == 1).unwrap();
        assert_eq!(a.downloaded_bytes, 5);
        let b = resumed.files.iter().find(|f| f.file_id == 2).unwrap();
        assert_eq!(b.downloaded_bytes, 0);

        let original_after = orchestrator.get_task(task_id, 1).await.unwrap();
        assert_eq!(original_after.files[0].downloaded_bytes, 5);
        assert_eq!(original_after.downloaded_bytes, 5);
    }
}
