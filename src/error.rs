//! Crate-wide error taxonomy.
//!
//! Each component keeps its own narrow error enum (`CatalogError`,
//! `ObjectStoreError`, `JobCacheError`) so component code never has to pick
//! the wrong variant of a grab-bag type; [`DriveError`] aggregates them at
//! the boundary the way the teacher's `JobError` aggregates `sea_orm::DbErr`
//! and `std::io::Error`.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::job_cache::JobCacheError;
use crate::object_store::ObjectStoreError;

pub type DriveResult<T = ()> = Result<T, DriveError>;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("quota exceeded for user {user_id}: current {current} + requested {requested} > capacity {capacity}")]
    QuotaExceeded {
        user_id: i64,
        current: i64,
        requested: i64,
        capacity: i64,
    },

    #[error("name conflict: {0}")]
    NameConflict(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("expired: {0}")]
    Expired(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    ObjectStore(#[from] ObjectStoreError),

    #[error(transparent)]
    JobCache(#[from] JobCacheError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriveError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DriveError::ObjectStore(_) | DriveError::JobCache(_) | DriveError::Io(_)
        )
    }
}
