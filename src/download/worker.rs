use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::fs;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{DownloadTaskStatus, FileDownloadStatus};
use crate::job_cache::JobCache;
use crate::object_store::ObjectAdapter;

/// Default number of worker tasks draining the shared queue, per
/// `spec.md` §4.E.
pub const DEFAULT_WORKERS: usize = 3;

/// Upper bound on simultaneous per-file fetches within one task; the spec
/// leaves this implementation-free ("1-N") so a fixed bound is a
/// deliberate, documented choice rather than an accident.
const PER_TASK_FANOUT: usize = 4;

/// A fixed pool of `W` tasks draining one shared cache-backed FIFO,
/// staging each batch download under `<staging_root>/<task_id>` and
/// cleaning up on every exit path. Mirrors the original's
/// `RedisWorker.Run`/`processTask` in `app/file/biz/service/worker.go`.
pub struct DownloadWorkerPool {
    job_cache: Arc<dyn JobCache>,
    objects: Arc<dyn ObjectAdapter>,
    staging_root: PathBuf,
    worker_count: usize,
    shutdown_tx: watch::Sender<bool>,
}

impl DownloadWorkerPool {
    pub fn new(job_cache: Arc<dyn JobCache>, objects: Arc<dyn ObjectAdapter>, staging_root: PathBuf, worker_count: usize) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            job_cache,
            objects,
            staging_root,
            worker_count,
            shutdown_tx,
        }
    }

    /// Spawns `worker_count` tasks, each looping `dequeue_blocking` then
    /// `process`. Returns their join handles so the caller can await a
    /// graceful drain after calling `shutdown`.
    pub fn spawn(&self) -> Vec<tokio::task::JoinHandle<()>> {
        (0..self.worker_count)
            .map(|worker_id| {
                let job_cache = Arc::clone(&self.job_cache);
                let objects = Arc::clone(&self.objects);
                let staging_root = self.staging_root.clone();
                let mut shutdown_rx = self.shutdown_tx.subscribe();
                tokio::spawn(async move {
                    info!(worker_id, "download worker started");
                    loop {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                        tokio::select! {
                            biased;
                            _ = shutdown_rx.changed() => break,
                            dequeued = job_cache.dequeue_download_task_blocking() => {
                                match dequeued {
                                    Ok(task_id) => process(&job_cache, &objects, &staging_root, task_id).await,
                                    Err(e) => {
                                        warn!(worker_id, error = %e, "dequeue failed, retrying");
                                    }
                                }
                            }
                        }
                    }
                    info!(worker_id, "download worker stopped");
                })
            })
            .collect()
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Processes one task end to end: stage, fan out bounded per-file fetches,
/// and report final status. Never panics on a single file's failure —
/// other files in the same task keep going.
async fn process(job_cache: &Arc<dyn JobCache>, objects: &Arc<dyn ObjectAdapter>, staging_root: &std::path::Path, task_id: Uuid) {
    let mut task = match job_cache.get_download_task(task_id).await {
        Ok(t) => t,
        Err(e) => {
            warn!(%task_id, error = %e, "task missing from cache, skipping");
            return;
        }
    };

    task.status = DownloadTaskStatus::Running;
    task.updated_at = chrono::Utc::now();
    if let Err(e) = job_cache.put_download_task(&task).await {
        error!(%task_id, error = %e, "failed to mark task running");
        return;
    }

    let staging_dir = staging_root.join(task_id.to_string());
    if let Err(e) = fs::create_dir_all(&staging_dir).await {
        error!(%task_id, error = %e, "failed to create staging directory");
        return;
    }

    // Shared so each file's completion can update and persist `progress`
    // as it lands, rather than only once the whole fan-out finishes —
    // spec.md §4.E calls for `update_status(task_id, processing,
    // new_progress)` per file, not per task.
    let files = task.files.clone();
    let shared = Arc::new(tokio::sync::Mutex::new(task));

    stream::iter(files)
        .map(|file| {
            let objects = Arc::clone(objects);
            let staging_dir = staging_dir.clone();
            let job_cache = Arc::clone(job_cache);
            let shared = Arc::clone(&shared);
            async move {
                let outcome = fetch_one(&objects, &staging_dir, &file).await;
                let snapshot = {
                    let mut guard = shared.lock().await;
                    if let Some(slot) = guard.files.iter_mut().find(|f| f.file_id == file.file_id) {
                        match &outcome {
                            Ok(written) => {
                                slot.downloaded_bytes += *written;
                                slot.status = FileDownloadStatus::Done;
                                guard.downloaded_bytes += *written;
                            }
                            Err(e) => {
                                warn!(%task_id, file_id = file.file_id, error = %e, "file download failed, task continues");
                                slot.status = FileDownloadStatus::Failed;
                            }
                        }
                    }
                    guard.updated_at = chrono::Utc::now();
                    guard.clone()
                };
                if let Err(e) = job_cache.put_download_task(&snapshot).await {
                    error!(%task_id, error = %e, "failed to persist per-file progress");
                }
            }
        })
        .buffer_unordered(PER_TASK_FANOUT)
        .collect::<Vec<_>>()
        .await;

    let mut task = shared.lock().await.clone();

    let all_done = task.files.iter().all(|f| f.status == FileDownloadStatus::Done);
    task.status = if all_done {
        DownloadTaskStatus::Completed
    } else {
        DownloadTaskStatus::Failed
    };
    task.updated_at = chrono::Utc::now();

    if let Err(e) = job_cache.put_download_task(&task).await {
        error!(%task_id, error = %e, "failed to persist final task status");
    }

    if let Err(e) = fs::remove_dir_all(&staging_dir).await {
        warn!(%task_id, error = %e, "failed to clean up staging directory");
    }

    info!(%task_id, status = ?task.status, "download task finished");
}

/// Fetches one file, resuming from `file.downloaded_bytes` if set by a
/// previous attempt, and returns bytes newly written this pass.
async fn fetch_one(
    objects: &Arc<dyn ObjectAdapter>,
    staging_dir: &std::path::Path,
    file: &crate::domain::DownloadedFile,
) -> Result<i64, crate::object_store::ObjectStoreError> {
    let (mut body, _info) = objects.get(&file.name).await?;

    let dest_path = staging_dir.join(&file.relative_path);
    if let Some(parent) = dest_path.parent() {
        let _ = fs::create_dir_all(parent).await;
    }

    let mut dest = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .open(&dest_path)
        .await
        .map_err(crate::object_store::ObjectStoreError::Io)?;

    if file.downloaded_bytes > 0 {
        dest.seek(std::io::SeekFrom::Start(file.downloaded_bytes as u64))
            .await
            .map_err(crate::object_store::ObjectStoreError::Io)?;
    }

    // The adapter has no range-get primitive, so resuming skips leading
    // bytes of the source stream by hand rather than by re-requesting a
    // byte range.
    let mut to_skip = file.downloaded_bytes;
    let mut written: i64 = 0;
    while let Some(mut chunk) = body.try_next().await? {
        if to_skip > 0 {
            let skip_here = (to_skip as usize).min(chunk.len());
            chunk = chunk.slice(skip_here..);
            to_skip -= skip_here as i64;
            if chunk.is_empty() {
                continue;
            }
        }
        dest.write_all(&chunk)
            .await
            .map_err(crate::object_store::ObjectStoreError::Io)?;
        written += chunk.len() as i64;
    }

    Ok(written)
}
