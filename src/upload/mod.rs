//! Upload ingress: single-shot dedup'd upload and streaming chunked
//! multipart upload, both committing through the catalog.

mod coordinator;

pub use coordinator::{Chunk, UploadCoordinator, UploadMetadata};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogStore;
    use crate::job_cache::MemoryJobCache;
    use crate::object_store::MemoryObjectAdapter;
    use bytes::Bytes;
    use std::sync::Arc;

    async fn test_catalog() -> Arc<CatalogStore> {
        let store = CatalogStore::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store.create_file_store(1, 1_000_000).await.unwrap();
        Arc::new(store)
    }

    fn coordinator(catalog: Arc<CatalogStore>) -> UploadCoordinator {
        UploadCoordinator::new(
            catalog,
            Arc::new(MemoryObjectAdapter::new()),
            Arc::new(MemoryJobCache::new()),
        )
    }

    #[tokio::test]
    async fn single_shot_upload_creates_file() {
        let catalog = test_catalog().await;
        let coordinator = coordinator(catalog.clone());
        let meta = UploadMetadata {
            user_id: 1,
            folder_id: 0,
            name: "a.txt".into(),
            hash: "hash-a".into(),
            size: 5,
            content_type: "text/plain".into(),
        };
        let file = coordinator
            .upload(meta, Bytes::from_static(b"hello"), "users/1/a.txt")
            .await
            .unwrap();
        assert_eq!(file.name, "a.txt");
        let store = catalog.get_file_store(1).await.unwrap();
        assert_eq!(store.current_size, 5);
    }

    #[tokio::test]
    async fn second_upload_with_same_hash_dedups() {
        let catalog = test_catalog().await;
        let coordinator = coordinator(catalog.clone());
        let meta = UploadMetadata {
            user_id: 1,
            folder_id: 0,
            name: "a.txt".into(),
            hash: "dup-hash".into(),
            size: 5,
            content_type: "text/plain".into(),
        };
        let first = coordinator
            .upload(meta, Bytes::from_static(b"hello"), "users/1/a.txt")
            .await
            .unwrap();

        let meta2 = UploadMetadata {
            user_id: 1,
            folder_id: 0,
            name: "b.txt".into(),
            hash: "dup-hash".into(),
            size: 5,
            content_type: "text/plain".into(),
        };
        let second = coordinator
            .upload(meta2, Bytes::from_static(b"hello"), "users/1/b.txt")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let store = catalog.get_file_store(1).await.unwrap();
        assert_eq!(store.current_size, 5);
    }

    #[tokio::test]
    async fn upload_over_quota_fails() {
        let catalog = test_catalog().await;
        catalog.create_file_store(2, 4).await.unwrap();
        let coordinator = coordinator(catalog);
        let meta = UploadMetadata {
            user_id: 2,
            folder_id: 0,
            name: "big.bin".into(),
            hash: "hash-big".into(),
            size: 5,
            content_type: "application/octet-stream".into(),
        };
        let err = coordinator
            .upload(meta, Bytes::from_static(b"hello"), "users/2/big.bin")
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::DriveError::QuotaExceeded { .. }));
    }

    #[tokio::test]
    async fn chunked_upload_assembles_and_commits() {
        let catalog = test_catalog().await;
        let coordinator = coordinator(catalog.clone());

        let session = coordinator
            .put_chunk(
                1,
                0,
                "big.bin",
                "users/1/big.bin",
                "application/octet-stream",
                Chunk {
                    upload_id: None,
                    part_number: 1,
                    data: Bytes::from_static(b"ab"),
                    is_last: false,
                    file_size: 4,
                },
            )
            .await
            .unwrap();

        let session = coordinator
            .put_chunk(
                1,
                0,
                "big.bin",
                "users/1/big.bin",
                "application/octet-stream",
                Chunk {
                    upload_id: Some(session.upload_id.clone()),
                    part_number: 2,
                    data: Bytes::from_static(b"cd"),
                    is_last: true,
                    file_size: 4,
                },
            )
            .await
            .unwrap();

        assert_eq!(session.bytes_received, 4);
        let store = catalog.get_file_store(1).await.unwrap();
        assert_eq!(store.current_size, 4);
    }

    #[tokio::test]
    async fn out_of_order_chunk_is_rejected() {
        let catalog = test_catalog().await;
        let coordinator = coordinator(catalog);
        let err = coordinator
            .put_chunk(
                1,
                0,
                "big.bin",
                "users/1/big.bin",
                "application/octet-stream",
                Chunk {
                    upload_id: None,
                    part_number: 2,
                    data: Bytes::from_static(b"cd"),
                    is_last: false,
                    file_size: 4,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::DriveError::InvalidArgument(_)));
    }
}
