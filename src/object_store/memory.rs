use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;

use super::adapter::{ByteStream, CompletedPartInfo, ObjectAdapter, ObjectInfo};
use super::error::ObjectStoreError;

type Result<T> = std::result::Result<T, ObjectStoreError>;

struct PendingUpload {
    key: String,
    parts: HashMap<u32, Bytes>,
}

/// In-process fake used by tests that need an `ObjectAdapter` without a
/// real bucket. Not thread-contended enough to warrant anything fancier
/// than a blocking `Mutex` guarding two `HashMap`s.
#[derive(Default)]
pub struct MemoryObjectAdapter {
    objects: Mutex<HashMap<String, Bytes>>,
    uploads: Mutex<HashMap<String, PendingUpload>>,
}

impl MemoryObjectAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectAdapter for MemoryObjectAdapter {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<ObjectInfo> {
        let size = bytes.len() as i64;
        self.objects.lock().unwrap().insert(key.to_owned(), bytes);
        Ok(ObjectInfo {
            key: key.to_owned(),
            size,
            etag: None,
        })
    }

    async fn get(&self, key: &str) -> Result<(ByteStream, ObjectInfo)> {
        let bytes = self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound(key.to_owned()))?;
        let info = ObjectInfo {
            key: key.to_owned(),
            size: bytes.len() as i64,
            etag: None,
        };
        let body = stream::once(async move { Ok(bytes) });
        Ok((Box::pin(body), info))
    }

    async fn stat(&self, key: &str) -> Result<ObjectInfo> {
        let bytes = self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound(key.to_owned()))?;
        Ok(ObjectInfo {
            key: key.to_owned(),
            size: bytes.len() as i64,
            etag: None,
        })
    }

    async fn presign_get(&self, key: &str, ttl_secs: u64) -> Result<String> {
        if !self.objects.lock().unwrap().contains_key(key) {
            return Err(ObjectStoreError::NotFound(key.to_owned()));
        }
        Ok(format!("memory://{key}?ttl={ttl_secs}"))
    }

    async fn multipart_init(&self, key: &str) -> Result<String> {
        let upload_id = uuid::Uuid::new_v4().to_string();
        self.uploads.lock().unwrap().insert(
            upload_id.clone(),
            PendingUpload {
                key: key.to_owned(),
                parts: HashMap::new(),
            },
        );
        Ok(upload_id)
    }

    async fn multipart_put_part(
        &self,
        _key: &str,
        upload_id: &str,
        part_number: u32,
        bytes: Bytes,
    ) -> Result<String> {
        let mut uploads = self.uploads.lock().unwrap();
        let upload = uploads
            .get_mut(upload_id)
            .ok_or_else(|| ObjectStoreError::MultipartPutPart(format!("unknown upload {upload_id}")))?;
        let etag = format!("etag-{part_number}-{}", bytes.len());
        upload.parts.insert(part_number, bytes);
        Ok(etag)
    }

    async fn multipart_complete(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPartInfo],
    ) -> Result<ObjectInfo> {
        let upload = self
            .uploads
            .lock()
            .unwrap()
            .remove(upload_id)
            .ok_or_else(|| ObjectStoreError::MultipartComplete(format!("unknown upload {upload_id}")))?;
        if upload.key != key {
            return Err(ObjectStoreError::MultipartComplete(
                "key mismatch on complete".into(),
            ));
        }
        let mut assembled = Vec::new();
        for part in parts {
            let chunk = upload.parts.get(&part.part_number).ok_or_else(|| {
                ObjectStoreError::MultipartComplete(format!("missing part {}", part.part_number))
            })?;
            assembled.extend_from_slice(chunk);
        }
        let bytes = Bytes::from(assembled);
        let size = bytes.len() as i64;
        self.objects.lock().unwrap().insert(key.to_owned(), bytes);
        Ok(ObjectInfo {
            key: key.to_owned(),
            size,
            etag: None,
        })
    }

    async fn multipart_abort(&self, _key: &str, upload_id: &str) -> Result<()> {
        self.uploads.lock().unwrap().remove(upload_id);
        Ok(())
    }
}
