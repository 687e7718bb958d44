use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("put failed: {0}")]
    Put(String),

    #[error("get failed: {0}")]
    Get(String),

    #[error("multipart init failed: {0}")]
    MultipartInit(String),

    #[error("multipart upload_part failed: {0}")]
    MultipartPutPart(String),

    #[error("multipart complete failed: {0}")]
    MultipartComplete(String),

    #[error("multipart abort failed: {0}")]
    MultipartAbort(String),

    #[error("presign failed: {0}")]
    Presign(String),

    #[error("staging I/O error: {0}")]
    Io(#[from] std::io::Error),
}
