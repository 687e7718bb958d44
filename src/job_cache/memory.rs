use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

use super::cache::JobCache;
use super::error::JobCacheError;
use crate::domain::{DownloadTask, UploadSession};

type Result<T> = std::result::Result<T, JobCacheError>;

#[derive(Default)]
struct State {
    tasks: HashMap<Uuid, DownloadTask>,
    queue: VecDeque<Uuid>,
    sessions: HashMap<String, UploadSession>,
}

/// In-process fake for tests: a `Mutex`-guarded queue plus a `Notify` so
/// `dequeue_download_task_blocking` genuinely blocks instead of busy-polling,
/// same shape as the worker pool's real wakeup path against Redis `BRPOP`.
pub struct MemoryJobCache {
    state: Mutex<State>,
    notify: Notify,
}

impl Default for MemoryJobCache {
    fn default() -> Self {
        Self {
            state: Mutex::new(State::default()),
            notify: Notify::new(),
        }
    }
}

impl MemoryJobCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobCache for MemoryJobCache {
    async fn enqueue_download_task(&self, task: &DownloadTask) -> Result<()> {
        let mut state = self.state.lock().await;
        state.tasks.insert(task.id, task.clone());
        state.queue.push_front(task.id);
        drop(state);
        self.notify.notify_one();
        Ok(())
    }

    async fn dequeue_download_task_blocking(&self) -> Result<Uuid> {
        loop {
            {
                let mut state = self.state.lock().await;
                if let Some(id) = state.queue.pop_back() {
                    return Ok(id);
                }
            }
            self.notify.notified().await;
        }
    }

    async fn get_download_task(&self, task_id: Uuid) -> Result<DownloadTask> {
        self.state
            .lock()
            .await
            .tasks
            .get(&task_id)
            .cloned()
            .ok_or(JobCacheError::TaskNotFound(task_id.to_string()))
    }

    async fn put_download_task(&self, task: &DownloadTask) -> Result<()> {
        self.state.lock().await.tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn put_upload_session(&self, session: &UploadSession) -> Result<()> {
        self.state
            .lock()
            .await
            .sessions
            .insert(session.upload_id.clone(), session.clone());
        Ok(())
    }

    async fn get_upload_session(&self, upload_id: &str) -> Result<UploadSession> {
        self.state
            .lock()
            .await
            .sessions
            .get(upload_id)
            .cloned()
            .ok_or_else(|| JobCacheError::SessionNotFound(upload_id.to_owned()))
    }

    async fn delete_upload_session(&self, upload_id: &str) -> Result<()> {
        self.state.lock().await.sessions.remove(upload_id);
        Ok(())
    }
}
