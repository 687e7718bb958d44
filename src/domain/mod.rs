//! Plain domain types shared across the catalog, upload, and download
//! engines. These are transport/storage-agnostic; `catalog::entities`
//! mirrors the three catalog-owned ones (`File`, `Folder`, `FileStore`)
//! into `sea_orm` models.

mod download_task;
mod file;
mod folder;
mod quota;
mod share_link;
mod upload_session;

pub use download_task::{DownloadTask, DownloadTaskStatus, DownloadedFile, FileDownloadStatus};
pub use file::{File, FileStatus};
pub use folder::{Folder, FolderStatus, ROOT_FOLDER_ID};
pub use quota::FileStore;
pub use share_link::{ShareFile, ShareLink, ShareLinkStatus};
pub use upload_session::UploadSession;
