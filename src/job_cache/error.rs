use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobCacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("upload session not found: {0}")]
    SessionNotFound(String),
}
