//! Atomic key-value operations for the download task queue/state and
//! upload part-tag bookkeeping, over Redis in production and an
//! in-process fake for tests.

mod cache;
mod error;
mod memory;
mod redis_cache;

pub use cache::{JobCache, TASK_TTL_SECS};
pub use error::JobCacheError;
pub use memory::MemoryJobCache;
pub use redis_cache::RedisJobCache;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DownloadTask, DownloadTaskStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_task(id: Uuid) -> DownloadTask {
        DownloadTask {
            id,
            user_id: 1,
            folder_name: "photos".into(),
            status: DownloadTaskStatus::Queued,
            total_size: 100,
            downloaded_bytes: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            files: vec![],
        }
    }

    #[tokio::test]
    async fn enqueue_then_dequeue_returns_same_task() {
        let cache = MemoryJobCache::new();
        let id = Uuid::new_v4();
        cache.enqueue_download_task(&sample_task(id)).await.unwrap();
        let dequeued = cache.dequeue_download_task_blocking().await.unwrap();
        assert_eq!(dequeued, id);
        let task = cache.get_download_task(id).await.unwrap();
        assert_eq!(task.id, id);
    }

    #[tokio::test]
    async fn dequeue_is_fifo() {
        let cache = MemoryJobCache::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        cache.enqueue_download_task(&sample_task(first)).await.unwrap();
        cache.enqueue_download_task(&sample_task(second)).await.unwrap();
        assert_eq!(cache.dequeue_download_task_blocking().await.unwrap(), first);
        assert_eq!(cache.dequeue_download_task_blocking().await.unwrap(), second);
    }

    #[tokio::test]
    async fn get_unknown_task_errors() {
        let cache = MemoryJobCache::new();
        let err = cache.get_download_task(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, JobCacheError::TaskNotFound(_)));
    }
}
