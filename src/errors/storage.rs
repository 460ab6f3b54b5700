use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Storage error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
