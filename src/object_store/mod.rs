//! Object storage adapter: single-shot put/get and multipart primitives
//! over an S3-compatible bucket, with an in-memory fake for tests.

mod adapter;
mod error;
mod memory;
mod s3;

pub use adapter::{ByteStream, CompletedPartInfo, ObjectAdapter, ObjectInfo};
pub use error::ObjectStoreError;
pub use memory::MemoryObjectAdapter;
pub use s3::S3ObjectAdapter;

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::StreamExt;

    #[tokio::test]
    async fn put_then_get_roundtrips() {
        let adapter = MemoryObjectAdapter::new();
        adapter.put("k1", Bytes::from_static(b"hello")).await.unwrap();
        let (mut stream, info) = adapter.get("k1").await.unwrap();
        assert_eq!(info.size, 5);
        let chunk = stream.next().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"hello");
    }

    #[tokio::test]
    async fn multipart_assembles_parts_in_order() {
        let adapter = MemoryObjectAdapter::new();
        let upload_id = adapter.multipart_init("big").await.unwrap();
        let etag1 = adapter
            .multipart_put_part("big", &upload_id, 1, Bytes::from_static(b"ab"))
            .await
            .unwrap();
        let etag2 = adapter
            .multipart_put_part("big", &upload_id, 2, Bytes::from_static(b"cd"))
            .await
            .unwrap();
        let info = adapter
            .multipart_complete(
                "big",
                &upload_id,
                &[
                    CompletedPartInfo { part_number: 1, etag: etag1 },
                    CompletedPartInfo { part_number: 2, etag: etag2 },
                ],
            )
            .await
            .unwrap();
        assert_eq!(info.size, 4);
        let (mut stream, _) = adapter.get("big").await.unwrap();
        let chunk = stream.next().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"abcd");
    }

    #[tokio::test]
    async fn get_missing_key_is_not_found() {
        let adapter = MemoryObjectAdapter::new();
        let err = match adapter.get("missing").await {
            Ok(_) => panic!("expected an error"),
            Err(e) => e,
        };
        assert!(matches!(err, ObjectStoreError::NotFound(_)));
    }
}
