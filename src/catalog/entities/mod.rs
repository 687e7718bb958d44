//! Sea-ORM entity definitions for the catalog's five tables.

pub mod file;
pub mod file_store;
pub mod folder;
pub mod share_file;
pub mod share_link;

pub use file::Entity as File;
pub use file_store::Entity as FileStore;
pub use folder::Entity as Folder;
pub use share_file::Entity as ShareFile;
pub use share_link::Entity as ShareLink;

pub use file::ActiveModel as FileActive;
pub use file_store::ActiveModel as FileStoreActive;
pub use folder::ActiveModel as FolderActive;
pub use share_file::ActiveModel as ShareFileActive;
pub use share_link::ActiveModel as ShareLinkActive;
