//! The transactional catalog: files, folders, per-user quota, and share
//! links, backed by `sea-orm`/`sqlx` over SQLite.

pub mod entities;
pub mod error;
pub mod migration;
mod store;

pub use error::CatalogError;
pub use store::{CatalogResult, CatalogStore};

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> CatalogStore {
        let store = CatalogStore::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store.create_file_store(1, 1_000).await.unwrap();
        store
    }

    #[tokio::test]
    async fn create_file_over_quota_is_rejected_and_leaves_current_size_unchanged() {
        let store = seeded().await;
        store
            .create_file(1, 0, "a.bin", "hash-a", "application/octet-stream", "users/1/a.bin", 900)
            .await
            .unwrap();

        let err = store
            .create_file(1, 0, "b.bin", "hash-b", "application/octet-stream", "users/1/b.bin", 200)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::QuotaExceeded {
                current: 900,
                requested: 200,
                capacity: 1_000,
                ..
            }
        ));

        let fs = store.get_file_store(1).await.unwrap();
        assert_eq!(fs.current_size, 900);
    }

    #[tokio::test]
    async fn move_folder_into_itself_is_rejected() {
        let store = seeded().await;
        let a = store.create_folder(1, 0, "a").await.unwrap();
        let err = store.move_folder(a.id, a.id, 1, "a").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn move_folder_into_own_subtree_is_rejected() {
        let store = seeded().await;
        let a = store.create_folder(1, 0, "a").await.unwrap();
        let b = store.create_folder(1, a.id, "b").await.unwrap();
        let err = store.move_folder(a.id, b.id, 1, "a").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn move_folder_rewrites_descendant_paths() {
        let store = seeded().await;
        let src = store.create_folder(1, 0, "src").await.unwrap();
        let child = store.create_folder(1, src.id, "child").await.unwrap();
        let grandchild = store.create_folder(1, child.id, "grandchild").await.unwrap();
        let dest = store.create_folder(1, 0, "dest").await.unwrap();

        store.move_folder(src.id, dest.id, 1, "moved").await.unwrap();

        let (_, folders) = store.list_folder(dest.id, 1).await.unwrap();
        let moved = folders.iter().find(|f| f.id == src.id).unwrap();
        assert_eq!(moved.path, "/dest/moved");

        let (_, dest_children) = store.list_folder(src.id, 1).await.unwrap();
        let child_after = dest_children.iter().find(|f| f.id == child.id).unwrap();
        assert_eq!(child_after.path, "/dest/moved/child");

        let (_, grandchildren) = store.list_folder(child.id, 1).await.unwrap();
        let grandchild_after = grandchildren.iter().find(|f| f.id == grandchild.id).unwrap();
        assert_eq!(grandchild_after.path, "/dest/moved/child/grandchild");
    }

    #[tokio::test]
    async fn delete_file_is_idempotent_and_frees_quota_once() {
        let store = seeded().await;
        let file = store
            .create_file(1, 0, "a.bin", "hash-a", "application/octet-stream", "users/1/a.bin", 100)
            .await
            .unwrap();

        store.delete_file(file.id, 1).await.unwrap();
        let fs = store.get_file_store(1).await.unwrap();
        assert_eq!(fs.current_size, 0);

        store.delete_file(file.id, 1).await.unwrap();
        let fs = store.get_file_store(1).await.unwrap();
        assert_eq!(fs.current_size, 0);
    }
}
