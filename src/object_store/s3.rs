use async_trait::async_trait;
use aws_sdk_s3::client::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream as AwsByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use bytes::Bytes;
use std::time::Duration;
use tracing::{info, warn};

use super::adapter::{ByteStream, CompletedPartInfo, ObjectAdapter, ObjectInfo};
use super::error::ObjectStoreError;

type Result<T> = std::result::Result<T, ObjectStoreError>;

/// Production `ObjectAdapter` over `aws-sdk-s3`, bucket-scoped, built the
/// way `examples/other_examples/…awslabs-edo…s3/mod.rs` builds its client
/// from an `aws_config::SdkConfig`.
pub struct S3ObjectAdapter {
    client: Client,
    bucket: String,
}

impl S3ObjectAdapter {
    pub fn new(sdk_config: &aws_config::SdkConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: Client::new(sdk_config),
            bucket: bucket.into(),
        }
    }

    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(&config, bucket)
    }
}

#[async_trait]
impl ObjectAdapter for S3ObjectAdapter {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<ObjectInfo> {
        let size = bytes.len() as i64;
        let output = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(AwsByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| ObjectStoreError::Put(e.to_string()))?;
        info!(key, size, "object put");
        Ok(ObjectInfo {
            key: key.to_owned(),
            size,
            etag: output.e_tag,
        })
    }

    async fn get(&self, key: &str) -> Result<(ByteStream, ObjectInfo)> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Get(e.to_string()))?;
        let info = ObjectInfo {
            key: key.to_owned(),
            size: output.content_length().unwrap_or(0),
            etag: output.e_tag.clone(),
        };
        let stream = futures::stream::try_unfold(output.body, |mut body| async move {
            match body.next().await {
                Some(Ok(bytes)) => Ok(Some((bytes, body))),
                Some(Err(e)) => Err(ObjectStoreError::Get(e.to_string())),
                None => Ok(None),
            }
        });
        Ok((Box::pin(stream), info))
    }

    async fn stat(&self, key: &str) -> Result<ObjectInfo> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::NotFound(format!("{key}: {e}")))?;
        Ok(ObjectInfo {
            key: key.to_owned(),
            size: output.content_length().unwrap_or(0),
            etag: output.e_tag,
        })
    }

    async fn presign_get(&self, key: &str, ttl_secs: u64) -> Result<String> {
        let config = PresigningConfig::expires_in(Duration::from_secs(ttl_secs))
            .map_err(|e| ObjectStoreError::Presign(e.to_string()))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|e| ObjectStoreError::Presign(e.to_string()))?;
        Ok(presigned.uri().to_string())
    }

    async fn multipart_init(&self, key: &str) -> Result<String> {
        let output = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::MultipartInit(e.to_string()))?;
        output
            .upload_id
            .ok_or_else(|| ObjectStoreError::MultipartInit("missing upload_id in response".into()))
    }

    async fn multipart_put_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: u32,
        bytes: Bytes,
    ) -> Result<String> {
        let output = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number as i32)
            .body(AwsByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| ObjectStoreError::MultipartPutPart(e.to_string()))?;
        output
            .e_tag
            .ok_or_else(|| ObjectStoreError::MultipartPutPart("missing etag in response".into()))
    }

    async fn multipart_complete(
        &self,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPartInfo],
    ) -> Result<ObjectInfo> {
        let completed_parts = parts
            .iter()
            .map(|p| {
                CompletedPart::builder()
                    .part_number(p.part_number as i32)
                    .e_tag(p.etag.clone())
                    .build()
            })
            .collect();
        let output = self
            .client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed_parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| ObjectStoreError::MultipartComplete(e.to_string()))?;
        info!(key, upload_id, parts = parts.len(), "multipart upload completed");
        let stat = self.stat(key).await?;
        Ok(ObjectInfo {
            key: key.to_owned(),
            size: stat.size,
            etag: output.e_tag,
        })
    }

    async fn multipart_abort(&self, key: &str, upload_id: &str) -> Result<()> {
        self.client
            .abort_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|e| ObjectStoreError::MultipartAbort(e.to_string()))?;
        warn!(key, upload_id, "multipart upload aborted");
        Ok(())
    }
}
