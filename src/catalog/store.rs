use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, ExprTrait}, ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait,
    Database, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, Statement, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::entities::{self, FileActive, FileStoreActive, FolderActive, ShareFileActive, ShareLinkActive};
use crate::catalog::error::CatalogError;
use crate::catalog::migration::Migrator;
use crate::domain::{File, FileStatus, Folder, FolderStatus, ROOT_FOLDER_ID};

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Transactional catalog of files and folders, one Sea-ORM connection per
/// process. Every mutating operation below runs in its own
/// `DatabaseTransaction`, matching the original's `db.Transaction(...)`
/// wrapping in `dao/file.go`.
pub struct CatalogStore {
    conn: DatabaseConnection,
}

impl CatalogStore {
    pub async fn connect(database_url: &str) -> CatalogResult<Self> {
        let mut opt = ConnectOptions::new(database_url.to_owned());
        opt.max_connections(10)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8))
            .sqlx_logging(false);
        let conn = Database::connect(opt).await?;
        if conn.get_database_backend() == DbBackend::Sqlite {
            for pragma in [
                "PRAGMA journal_mode=WAL",
                "PRAGMA synchronous=NORMAL",
                "PRAGMA foreign_keys=ON",
            ] {
                let _ = conn
                    .execute(Statement::from_string(DbBackend::Sqlite, pragma))
                    .await;
            }
        }
        Ok(Self { conn })
    }

    pub async fn migrate(&self) -> CatalogResult<()> {
        Migrator::up(&self.conn, None).await?;
        info!("catalog migrations applied");
        Ok(())
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Insert a new file row and atomically debit the user's quota in the
    /// same transaction. The quota update is a single conditional
    /// `UPDATE ... WHERE current_size + :size <= capacity`; if it affects
    /// zero rows the whole transaction rolls back with `QuotaExceeded`.
    pub async fn create_file(
        &self,
        user_id: i64,
        folder_id: i64,
        name: &str,
        hash: &str,
        mime_type: &str,
        path: &str,
        size: i64,
    ) -> CatalogResult<File> {
        let txn = self.conn.begin().await?;

        let conflict = entities::File::find()
            .filter(entities::file::Column::UserId.eq(user_id))
            .filter(entities::file::Column::FolderId.eq(folder_id))
            .filter(entities::file::Column::Name.eq(name))
            .filter(entities::file::Column::Status.eq(0))
            .one(&txn)
            .await?;
        if conflict.is_some() {
            return Err(CatalogError::NameConflict(name.to_owned()));
        }

        let now = Utc::now().timestamp();
        let active = FileActive {
            user_id: Set(user_id),
            folder_id: Set(folder_id),
            name: Set(name.to_owned()),
            hash: Set(hash.to_owned()),
            mime_type: Set(mime_type.to_owned()),
            path: Set(path.to_owned()),
            size: Set(size),
            status: Set(0),
            ctime: Set(now),
            utime: Set(now),
            ..Default::default()
        };
        let inserted = active.insert(&txn).await?;

        let update = entities::FileStore::update_many()
            .col_expr(
                entities::file_store::Column::CurrentSize,
                Expr::col(entities::file_store::Column::CurrentSize).add(size),
            )
            .col_expr(entities::file_store::Column::Utime, Expr::value(now))
            .filter(entities::file_store::Column::UserId.eq(user_id))
            .filter(
                Expr::col(entities::file_store::Column::CurrentSize)
                    .add(size)
                    .lte(Expr::col(entities::file_store::Column::Capacity)),
            )
            .exec(&txn)
            .await?;

        if update.rows_affected == 0 {
            warn!(user_id, size, "quota exceeded on create_file");
            let store = entities::FileStore::find()
                .filter(entities::file_store::Column::UserId.eq(user_id))
                .one(&txn)
                .await?
                .ok_or_else(|| CatalogError::NotFound {
                    kind: "file_store",
                    id: user_id.to_string(),
                })?;
            return Err(CatalogError::QuotaExceeded {
                user_id,
                current: store.current_size,
                requested: size,
                capacity: store.capacity,
            });
        }

        txn.commit().await?;
        info!(file_id = inserted.id, user_id, size, "file created");
        Ok(model_to_file(inserted))
    }

    /// First non-deleted file anywhere with this hash, driving the
    /// instant-upload dedup fast path.
    pub async fn query_by_hash(&self, hash: &str) -> CatalogResult<Option<File>> {
        let found = entities::File::find()
            .filter(entities::file::Column::Hash.eq(hash))
            .filter(entities::file::Column::Status.eq(0))
            .one(&self.conn)
            .await?;
        Ok(found.map(model_to_file))
    }

    /// Advisory-only: the authoritative check happens inside `create_file`.
    pub async fn query_capacity(&self, user_id: i64, size: i64) -> CatalogResult<bool> {
        let store = entities::FileStore::find()
            .filter(entities::file_store::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?
            .ok_or_else(|| CatalogError::NotFound {
                kind: "file_store",
                id: user_id.to_string(),
            })?;
        Ok(store.current_size + size <= store.capacity)
    }

    pub async fn get_file_store(&self, user_id: i64) -> CatalogResult<crate::domain::FileStore> {
        let store = entities::FileStore::find()
            .filter(entities::file_store::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?
            .ok_or(CatalogError::NotFound {
                kind: "file_store",
                id: user_id.to_string(),
            })?;
        Ok(crate::domain::FileStore {
            user_id: store.user_id,
            capacity: store.capacity,
            current_size: store.current_size,
            created_at_unix: store.ctime,
            updated_at_unix: store.utime,
        })
    }

    pub async fn create_file_store(&self, user_id: i64, capacity: i64) -> CatalogResult<()> {
        let now = Utc::now().timestamp();
        let active = FileStoreActive {
            user_id: Set(user_id),
            capacity: Set(capacity),
            current_size: Set(0),
            ctime: Set(now),
            utime: Set(now),
            ..Default::default()
        };
        active.insert(&self.conn).await?;
        Ok(())
    }

    pub async fn get_file(&self, file_id: i64, user_id: i64) -> CatalogResult<File> {
        entities::File::find()
            .filter(entities::file::Column::Id.eq(file_id))
            .filter(entities::file::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await?
            .map(model_to_file)
            .ok_or(CatalogError::NotFound {
                kind: "file",
                id: file_id.to_string(),
            })
    }

    pub async fn get_files_by_ids(&self, file_ids: &[i64]) -> CatalogResult<Vec<File>> {
        let rows = entities::File::find()
            .filter(entities::file::Column::Id.is_in(file_ids.to_vec()))
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(model_to_file).collect())
    }

    /// `folder.path = parent.path + "/" + name`, root's own path treated as
    /// empty so its direct children get a single leading slash.
    pub async fn create_folder(&self, user_id: i64, parent_id: i64, name: &str) -> CatalogResult<Folder> {
        let txn = self.conn.begin().await?;

        let parent_path = if parent_id == ROOT_FOLDER_ID {
            String::new()
        } else {
            entities::Folder::find()
                .filter(entities::folder::Column::Id.eq(parent_id))
                .filter(entities::folder::Column::UserId.eq(user_id))
                .one(&txn)
                .await?
                .ok_or(CatalogError::NotFound {
                    kind: "folder",
                    id: parent_id.to_string(),
                })?
                .path
        };
        let path = format!("{parent_path}/{name}");

        let now = Utc::now().timestamp();
        let active = FolderActive {
            user_id: Set(user_id),
            parent_id: Set(parent_id),
            name: Set(name.to_owned()),
            path: Set(path),
            status: Set(0),
            ctime: Set(now),
            utime: Set(now),
            ..Default::default()
        };
        let inserted = active.insert(&txn).await?;
        txn.commit().await?;
        Ok(model_to_folder(inserted))
    }

    pub async fn move_file(&self, file_id: i64, to_folder_id: i64, user_id: i64) -> CatalogResult<()> {
        let now = Utc::now().timestamp();
        let result = entities::File::update_many()
            .col_expr(entities::file::Column::FolderId, Expr::value(to_folder_id))
            .col_expr(entities::file::Column::Utime, Expr::value(now))
            .filter(entities::file::Column::Id.eq(file_id))
            .filter(entities::file::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(CatalogError::NotFound {
                kind: "file",
                id: file_id.to_string(),
            });
        }
        Ok(())
    }

    /// Rewrites the source folder's path and the path of every descendant
    /// whose path starts with the old prefix, so a subtree move is a single
    /// prefix substring replace rather than a walk of `parent_id` links.
    pub async fn move_folder(
        &self,
        folder_id: i64,
        to_folder_id: i64,
        user_id: i64,
        new_name: &str,
    ) -> CatalogResult<()> {
        if folder_id == to_folder_id {
            return Err(CatalogError::InvalidArgument(
                "cannot move a folder into itself".into(),
            ));
        }

        let txn = self.conn.begin().await?;

        let source = entities::Folder::find()
            .filter(entities::folder::Column::Id.eq(folder_id))
            .filter(entities::folder::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or(CatalogError::NotFound {
                kind: "folder",
                id: folder_id.to_string(),
            })?;

        let dest_path = if to_folder_id == ROOT_FOLDER_ID {
            String::new()
        } else {
            let dest = entities::Folder::find()
                .filter(entities::folder::Column::Id.eq(to_folder_id))
                .filter(entities::folder::Column::UserId.eq(user_id))
                .one(&txn)
                .await?
                .ok_or(CatalogError::NotFound {
                    kind: "folder",
                    id: to_folder_id.to_string(),
                })?;
            if dest.parent_id == folder_id || dest.path.starts_with(&format!("{}/", source.path)) {
                return Err(CatalogError::InvalidArgument(
                    "cannot move a folder into its own subtree".into(),
                ));
            }
            dest.path
        };
        let new_path = format!("{dest_path}/{new_name}");

        let now = Utc::now().timestamp();

        entities::Folder::update_many()
            .col_expr(entities::folder::Column::ParentId, Expr::value(to_folder_id))
            .col_expr(entities::folder::Column::Name, Expr::value(new_name))
            .col_expr(entities::folder::Column::Path, Expr::value(new_path.clone()))
            .col_expr(entities::folder::Column::Utime, Expr::value(now))
            .filter(entities::folder::Column::Id.eq(folder_id))
            .filter(entities::folder::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        let descendants = entities::Folder::find()
            .filter(entities::folder::Column::UserId.eq(user_id))
            .filter(entities::folder::Column::Path.like(format!("{}/%", source.path)))
            .all(&txn)
            .await?;
        for descendant in descendants {
            let rewritten = format!("{new_path}{}", &descendant.path[source.path.len()..]);
            let mut active: FolderActive = descendant.into();
            active.path = Set(rewritten);
            active.utime = Set(now);
            active.update(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }

    /// Idempotent: deleting an already-deleted row is a no-op, no quota change.
    pub async fn delete_file(&self, file_id: i64, user_id: i64) -> CatalogResult<()> {
        let txn = self.conn.begin().await?;

        let file = entities::File::find()
            .filter(entities::file::Column::Id.eq(file_id))
            .filter(entities::file::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or(CatalogError::NotFound {
                kind: "file",
                id: file_id.to_string(),
            })?;

        if file.status != 0 {
            return Ok(());
        }

        let now = Utc::now().timestamp();
        entities::File::update_many()
            .col_expr(entities::file::Column::Status, Expr::value(1))
            .col_expr(entities::file::Column::Utime, Expr::value(now))
            .filter(entities::file::Column::Id.eq(file_id))
            .exec(&txn)
            .await?;

        entities::FileStore::update_many()
            .col_expr(
                entities::file_store::Column::CurrentSize,
                Expr::col(entities::file_store::Column::CurrentSize).sub(file.size),
            )
            .col_expr(entities::file_store::Column::Utime, Expr::value(now))
            .filter(entities::file_store::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    /// Does not recurse into subfolders: only files directly in `folder_id`
    /// are trimmed from the quota and marked deleted.
    pub async fn delete_folder(&self, folder_id: i64, user_id: i64) -> CatalogResult<()> {
        let txn = self.conn.begin().await?;

        let files = entities::File::find()
            .filter(entities::file::Column::UserId.eq(user_id))
            .filter(entities::file::Column::FolderId.eq(folder_id))
            .filter(entities::file::Column::Status.eq(0))
            .all(&txn)
            .await?;
        let total_size: i64 = files.iter().map(|f| f.size).sum();

        let now = Utc::now().timestamp();

        entities::File::update_many()
            .col_expr(entities::file::Column::Status, Expr::value(1))
            .col_expr(entities::file::Column::Utime, Expr::value(now))
            .filter(entities::file::Column::UserId.eq(user_id))
            .filter(entities::file::Column::FolderId.eq(folder_id))
            .exec(&txn)
            .await?;

        if total_size > 0 {
            entities::FileStore::update_many()
                .col_expr(
                    entities::file_store::Column::CurrentSize,
                    Expr::col(entities::file_store::Column::CurrentSize).sub(total_size),
                )
                .col_expr(entities::file_store::Column::Utime, Expr::value(now))
                .filter(entities::file_store::Column::UserId.eq(user_id))
                .exec(&txn)
                .await?;
        }

        let result = entities::Folder::update_many()
            .col_expr(entities::folder::Column::Status, Expr::value(1))
            .col_expr(entities::folder::Column::Utime, Expr::value(now))
            .filter(entities::folder::Column::Id.eq(folder_id))
            .filter(entities::folder::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(CatalogError::NotFound {
                kind: "folder",
                id: folder_id.to_string(),
            });
        }

        txn.commit().await?;
        Ok(())
    }

    /// Paginated name search over active files; folders are returned in
    /// full, unpaginated, matching the original's observed behavior.
    pub async fn search(
        &self,
        user_id: i64,
        query: &str,
        page: u64,
        size: u64,
    ) -> CatalogResult<(Vec<File>, Vec<Folder>)> {
        let pattern = format!("%{query}%");
        let page = page.max(1);

        let files = entities::File::find()
            .filter(entities::file::Column::UserId.eq(user_id))
            .filter(entities::file::Column::Status.eq(0))
            .filter(entities::file::Column::Name.like(&pattern))
            .order_by_desc(entities::file::Column::Ctime)
            .paginate(&self.conn, size)
            .fetch_page(page - 1)
            .await?;

        let folders = entities::Folder::find()
            .filter(entities::folder::Column::UserId.eq(user_id))
            .filter(entities::folder::Column::Status.eq(0))
            .filter(entities::folder::Column::Name.like(&pattern))
            .order_by_desc(entities::folder::Column::Ctime)
            .all(&self.conn)
            .await?;

        Ok((
            files.into_iter().map(model_to_file).collect(),
            folders.into_iter().map(model_to_folder).collect(),
        ))
    }

    /// Active child files and subfolders, read in one transaction for
    /// snapshot consistency.
    pub async fn list_folder(&self, folder_id: i64, user_id: i64) -> CatalogResult<(Vec<File>, Vec<Folder>)> {
        let txn = self.conn.begin().await?;

        let files = entities::File::find()
            .filter(entities::file::Column::FolderId.eq(folder_id))
            .filter(entities::file::Column::UserId.eq(user_id))
            .filter(entities::file::Column::Status.eq(0))
            .all(&txn)
            .await?;

        let folders = entities::Folder::find()
            .filter(entities::folder::Column::ParentId.eq(folder_id))
            .filter(entities::folder::Column::UserId.eq(user_id))
            .filter(entities::folder::Column::Status.eq(0))
            .all(&txn)
            .await?;

        txn.commit().await?;
        Ok((
            files.into_iter().map(model_to_file).collect(),
            folders.into_iter().map(model_to_folder).collect(),
        ))
    }

    pub async fn create_share_link(
        &self,
        user_id: i64,
        folder_id: i64,
        password: Option<String>,
        expire_at: chrono::DateTime<Utc>,
    ) -> CatalogResult<String> {
        let id = Uuid::new_v4().to_string();
        let active = ShareLinkActive {
            id: Set(id.clone()),
            user_id: Set(user_id),
            folder_id: Set(folder_id),
            password: Set(password),
            created_at: Set(Utc::now().into()),
            expire_at: Set(expire_at.into()),
            status: Set(1),
        };
        active.insert(&self.conn).await?;
        Ok(id)
    }

    pub async fn create_share_file(&self, share_id: &str, file_id: i64) -> CatalogResult<()> {
        let active = ShareFileActive {
            share_id: Set(share_id.to_owned()),
            file_id: Set(file_id),
        };
        active.insert(&self.conn).await?;
        Ok(())
    }

    /// Returns `NotFound` if the id is unknown, `Expired` if it exists but
    /// `ShareLink::is_usable` no longer holds for it.
    pub async fn get_share_link(&self, share_id: &str) -> CatalogResult<crate::domain::ShareLink> {
        let model = entities::ShareLink::find_by_id(share_id.to_owned())
            .one(&self.conn)
            .await?
            .ok_or(CatalogError::NotFound {
                kind: "share_link",
                id: share_id.to_owned(),
            })?;
        let link = model_to_share_link(model)?;
        if !link.is_usable(Utc::now()) {
            return Err(CatalogError::Expired(share_id.to_owned()));
        }
        Ok(link)
    }
}

fn model_to_file(m: entities::file::Model) -> File {
    File {
        id: m.id,
        user_id: m.user_id,
        folder_id: m.folder_id,
        name: m.name,
        hash: m.hash,
        mime_type: m.mime_type,
        size: m.size,
        path_hint: Some(m.path),
        status: if m.status == 0 { FileStatus::Active } else { FileStatus::Deleted },
        created_at: chrono::DateTime::from_timestamp(m.ctime, 0).unwrap_or_else(Utc::now),
        updated_at: chrono::DateTime::from_timestamp(m.utime, 0).unwrap_or_else(Utc::now),
    }
}

fn model_to_share_link(m: entities::share_link::Model) -> CatalogResult<crate::domain::ShareLink> {
    use crate::domain::ShareLinkStatus;

    let id = Uuid::parse_str(&m.id).map_err(|e| CatalogError::InvalidArgument(e.to_string()))?;
    let status = match m.status {
        1 => ShareLinkStatus::Active,
        2 => ShareLinkStatus::Expired,
        _ => ShareLinkStatus::Cancelled,
    };
    Ok(crate::domain::ShareLink {
        id,
        user_id: m.user_id,
        folder_id: m.folder_id,
        password: m.password,
        created_at: m.created_at,
        expire_at: m.expire_at,
        status,
    })
}

fn model_to_folder(m: entities::folder::Model) -> Folder {
    Folder {
        id: m.id,
        user_id: m.user_id,
        parent_id: m.parent_id,
        name: m.name,
        path: m.path,
        status: if m.status == 0 { FolderStatus::Active } else { FolderStatus::Deleted },
        created_at: chrono::DateTime::from_timestamp(m.ctime, 0).unwrap_or_else(Utc::now),
        updated_at: chrono::DateTime::from_timestamp(m.utime, 0).unwrap_or_else(Utc::now),
    }
}
