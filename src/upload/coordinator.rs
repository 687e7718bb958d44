use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use crate::catalog::CatalogStore;
use crate::domain::{File, UploadSession};
use crate::error::{DriveError, DriveResult};
use crate::job_cache::JobCache;
use crate::object_store::{CompletedPartInfo, ObjectAdapter};

/// Metadata accompanying a single-shot upload call.
pub struct UploadMetadata {
    pub user_id: i64,
    pub folder_id: i64,
    pub name: String,
    pub hash: String,
    pub size: i64,
    pub content_type: String,
}

/// One client-streaming chunk in a multipart upload session, per
/// `spec.md` §4.D's `Chunk{filename, part_number, data, file_size,
/// user_id, folder_id}` frame.
pub struct Chunk {
    pub upload_id: Option<String>,
    pub part_number: u32,
    pub data: Bytes,
    pub is_last: bool,
    /// Total size of the file being assembled, carried on the first frame
    /// so the session can be admitted against quota before `multipart_init`.
    pub file_size: i64,
}

/// Orchestrates both upload ingress modes: single-shot (with instant-upload
/// dedup) and streaming chunked multipart.
pub struct UploadCoordinator {
    catalog: Arc<CatalogStore>,
    objects: Arc<dyn ObjectAdapter>,
    job_cache: Arc<dyn JobCache>,
}

impl UploadCoordinator {
    pub fn new(catalog: Arc<CatalogStore>, objects: Arc<dyn ObjectAdapter>, job_cache: Arc<dyn JobCache>) -> Self {
        Self {
            catalog,
            objects,
            job_cache,
        }
    }

    /// Dedup fast path, then quota check, then a best-effort async
    /// object-store mirror racing a synchronous catalog commit — the
    /// catalog row is the authoritative write (see `SPEC_FULL.md` §9,
    /// open question (a)).
    pub async fn upload(&self, meta: UploadMetadata, bytes: Bytes, object_key: &str) -> DriveResult<File> {
        if let Some(existing) = self.catalog.query_by_hash(&meta.hash).await? {
            info!(hash = %meta.hash, file_id = existing.id, "instant upload: dedup hit");
            return Ok(existing);
        }

        if !self.catalog.query_capacity(meta.user_id, meta.size).await? {
            let store = self.catalog.get_file_store(meta.user_id).await?;
            return Err(DriveError::QuotaExceeded {
                user_id: meta.user_id,
                current: store.current_size,
                requested: meta.size,
                capacity: store.capacity,
            });
        }

        let objects = Arc::clone(&self.objects);
        let mirror_key = object_key.to_owned();
        let mirror_bytes = bytes.clone();
        tokio::spawn(async move {
            if let Err(e) = objects.put(&mirror_key, mirror_bytes).await {
                warn!(key = %mirror_key, error = %e, "best-effort object-store mirror failed");
            }
        });

        let file = self
            .catalog
            .create_file(
                meta.user_id,
                meta.folder_id,
                &meta.name,
                &meta.hash,
                &meta.content_type,
                object_key,
                meta.size,
            )
            .await?;
        Ok(file)
    }

    /// Handles one chunk of a streaming multipart session. Callers drive
    /// this once per inbound frame; part numbers must be strictly
    /// increasing within a session — a caller-side protocol violation is
    /// reported as `InvalidArgument` rather than silently reordered.
    pub async fn put_chunk(
        &self,
        user_id: i64,
        folder_id: i64,
        name: &str,
        object_key: &str,
        mime_type: &str,
        chunk: Chunk,
    ) -> DriveResult<UploadSession> {
        let mut session = match chunk.upload_id {
            Some(ref id) => self.job_cache.get_upload_session(id).await?,
            None => {
                if !self.catalog.query_capacity(user_id, chunk.file_size).await? {
                    let store = self.catalog.get_file_store(user_id).await?;
                    return Err(DriveError::QuotaExceeded {
                        user_id,
                        current: store.current_size,
                        requested: chunk.file_size,
                        capacity: store.capacity,
                    });
                }
                let upload_id = self.objects.multipart_init(object_key).await?;
                UploadSession {
                    upload_id,
                    user_id,
                    folder_id,
                    name: name.to_owned(),
                    object_key: object_key.to_owned(),
                    mime_type: mime_type.to_owned(),
                    parts: Default::default(),
                    bytes_received: 0,
                    created_at: Utc::now(),
                }
            }
        };

        let expected = session.next_part_number();
        if chunk.part_number != expected {
            self.abort_session(object_key, &session).await;
            return Err(DriveError::InvalidArgument(format!(
                "expected part {expected}, got {}",
                chunk.part_number
            )));
        }

        let bytes_in_chunk = chunk.data.len() as i64;
        let etag = self
            .objects
            .multipart_put_part(object_key, &session.upload_id, chunk.part_number, chunk.data)
            .await?;
        session.parts.insert(chunk.part_number, etag);
        session.bytes_received += bytes_in_chunk;
        self.job_cache.put_upload_session(&session).await?;

        if chunk.is_last {
            self.complete_session(session.clone()).await?;
        }

        Ok(session)
    }

    /// Sorts the recorded part tags ascending, completes the multipart
    /// upload, learns the authoritative final size, then commits the
    /// catalog row. A failure here orphans the object (swept by
    /// maintenance, not this crate — see `SPEC_FULL.md` §9).
    async fn complete_session(&self, session: UploadSession) -> DriveResult<File> {
        if !session.is_complete_sequence() {
            self.abort_session(&session.object_key, &session).await;
            return Err(DriveError::InvalidArgument(
                "multipart session has gaps in its part sequence".into(),
            ));
        }
        let sorted_parts: Vec<CompletedPartInfo> = session
            .sorted_parts()
            .into_iter()
            .map(|(part_number, etag)| CompletedPartInfo { part_number, etag })
            .collect();

        let info = self
            .objects
            .multipart_complete(&session.object_key, &session.upload_id, &sorted_parts)
            .await?;

        // Streamed uploads skip instant-upload dedup (spec.md §4.D only
        // specifies hash-based dedup for the single-shot path), so the
        // catalog hash column gets a digest of the object key rather than
        // content: good enough for uniqueness bookkeeping, not for dedup.
        let hash = content_hash_placeholder(&session.object_key, &session.upload_id);

        let result = self
            .catalog
            .create_file(
                session.user_id,
                session.folder_id,
                &session.name,
                &hash,
                &session.mime_type,
                &session.object_key,
                info.size,
            )
            .await;

        self.job_cache.delete_upload_session(&session.upload_id).await?;

        match result {
            Ok(file) => Ok(file),
            Err(e) => {
                error!(
                    upload_id = %session.upload_id,
                    key = %session.object_key,
                    error = %e,
                    "catalog commit failed after multipart complete; object orphaned"
                );
                Err(e.into())
            }
        }
    }

    /// Best-effort cleanup when a session will not be completed: abort the
    /// store-side multipart upload and drop its job-cache record, per
    /// `spec.md` §7 ("aborts... required whenever a session will not be
    /// completed"). Failures here are logged, not propagated — the caller
    /// is already returning the protocol error that triggered this.
    async fn abort_session(&self, object_key: &str, session: &UploadSession) {
        if let Err(e) = self.objects.multipart_abort(object_key, &session.upload_id).await {
            warn!(upload_id = %session.upload_id, key = object_key, error = %e, "multipart abort failed");
        }
        if let Err(e) = self.job_cache.delete_upload_session(&session.upload_id).await {
            warn!(upload_id = %session.upload_id, error = %e, "failed to drop aborted upload session from cache");
        }
    }
}

fn content_hash_placeholder(object_key: &str, upload_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(object_key.as_bytes());
    hasher.update(upload_id.as_bytes());
    hex::encode(hasher.finalize())
}
