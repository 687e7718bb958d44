//! Initial migration: files, folders, file_stores, share_links, share_files.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Folders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Folders::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Folders::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Folders::ParentId).big_integer().not_null())
                    .col(ColumnDef::new(Folders::Name).string().not_null())
                    .col(ColumnDef::new(Folders::Path).string().not_null())
                    .col(ColumnDef::new(Folders::Status).integer().not_null().default(0))
                    .col(ColumnDef::new(Folders::Ctime).big_integer().not_null())
                    .col(ColumnDef::new(Folders::Utime).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Files::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Files::UserId).big_integer().not_null())
                    // `0` is the root sentinel (spec's folder id 0 is never a real
                    // `folders` row), so this column intentionally carries no FK.
                    .col(ColumnDef::new(Files::FolderId).big_integer().not_null())
                    .col(ColumnDef::new(Files::Name).string().not_null())
                    .col(ColumnDef::new(Files::Hash).string().not_null())
                    .col(ColumnDef::new(Files::MimeType).string().not_null())
                    .col(ColumnDef::new(Files::Path).string().not_null())
                    .col(ColumnDef::new(Files::Size).big_integer().not_null())
                    .col(ColumnDef::new(Files::Status).integer().not_null().default(0))
                    .col(ColumnDef::new(Files::Ctime).big_integer().not_null())
                    .col(ColumnDef::new(Files::Utime).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FileStores::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FileStores::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FileStores::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(FileStores::Capacity)
                            .big_integer()
                            .not_null()
                            .default(10_737_418_240i64),
                    )
                    .col(
                        ColumnDef::new(FileStores::CurrentSize)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(FileStores::Ctime).big_integer().not_null())
                    .col(ColumnDef::new(FileStores::Utime).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ShareLinks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ShareLinks::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(ShareLinks::UserId).big_integer().not_null())
                    .col(ColumnDef::new(ShareLinks::FolderId).big_integer().not_null())
                    .col(ColumnDef::new(ShareLinks::Password).string())
                    .col(
                        ColumnDef::new(ShareLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShareLinks::ExpireAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ShareLinks::Status).integer().not_null().default(1))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ShareFiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ShareFiles::ShareId).string().not_null())
                    .col(ColumnDef::new(ShareFiles::FileId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ShareFiles::ShareId)
                            .col(ShareFiles::FileId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ShareFiles::Table, ShareFiles::ShareId)
                            .to(ShareLinks::Table, ShareLinks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_files_hash")
                    .table(Files::Table)
                    .col(Files::Hash)
                    .to_owned(),
            )
            .await?;

        // Uniqueness holds only "among non-deleted rows" (status = 0 / active);
        // sea-query's `Index` builder has no partial-index predicate, so this
        // goes through raw SQL instead of `manager.create_index`.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX idx_files_user_folder_name \
                 ON files (user_id, folder_id, name) WHERE status = 0",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_folders_path")
                    .table(Folders::Table)
                    .col(Folders::UserId)
                    .col(Folders::Path)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_share_links_expire")
                    .table(ShareLinks::Table)
                    .col(ShareLinks::ExpireAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShareFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ShareLinks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FileStores::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Files::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Folders::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Folders {
    Table,
    Id,
    UserId,
    ParentId,
    Name,
    Path,
    Status,
    Ctime,
    Utime,
}

#[derive(Iden)]
enum Files {
    Table,
    Id,
    UserId,
    FolderId,
    Name,
    Hash,
    MimeType,
    Path,
    Size,
    Status,
    Ctime,
    Utime,
}

#[derive(Iden)]
enum FileStores {
    Table,
    Id,
    UserId,
    Capacity,
    CurrentSize,
    Ctime,
    Utime,
}

#[derive(Iden)]
enum ShareLinks {
    Table,
    Id,
    UserId,
    FolderId,
    Password,
    CreatedAt,
    ExpireAt,
    Status,
}

#[derive(Iden)]
enum ShareFiles {
    Table,
    ShareId,
    FileId,
}
