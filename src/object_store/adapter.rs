use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use super::error::ObjectStoreError;

type Result<T> = std::result::Result<T, ObjectStoreError>;

/// Chunked byte stream returned by `get`; the download worker copies this
/// straight to its staging file without buffering the whole object.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Metadata returned by a put, multipart-complete, or stat call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: i64,
    pub etag: Option<String>,
}

/// One part in an ascending, 1-based, gap-free sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPartInfo {
    pub part_number: u32,
    pub etag: String,
}

/// Wraps the object store's single-shot and multipart primitives. Mirrors
/// `spec.md` §4.A: the coordinator, not the adapter, decides retry vs.
/// abort on any error surfaced here.
#[async_trait]
pub trait ObjectAdapter: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<ObjectInfo>;

    /// A lazy reader paired with size/etag metadata, per `spec.md` §4.A.
    async fn get(&self, key: &str) -> Result<(ByteStream, ObjectInfo)>;

    async fn stat(&self, key: &str) -> Result<ObjectInfo>;

    async fn presign_get(&self, key: &str, ttl_secs: u64) -> Result<String>;

    async fn multipart_init(&self, key: &str) -> Result<String>;

    async fn multipart_put_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: u32,
        bytes: Bytes,
    ) -> Result<String>;

    /// `parts` must already be sorted ascending by `part_number` with no
    /// gaps; callers (the upload coordinator) are responsible for sorting.
    async fn multipart_complete(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPartInfo],
    ) -> Result<ObjectInfo>;

    async fn multipart_abort(&self, key: &str, upload_id: &str) -> Result<()>;
}
