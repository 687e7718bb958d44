use thiserror::Error;

/// Errors surfaced by the catalog store. Aggregated into `DriveError` at
/// the crate boundary; callers inside `catalog` should never need to
/// construct `DriveError` directly.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("quota exceeded for user {user_id}: current={current} requested={requested} capacity={capacity}")]
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

    #[error("share link expired or inactive: {0}")]
    Expired(String),
}
