// Request-level error type plus the narrower errors raised by services and forms.
use thiserror::Error;

pub mod response;
pub mod auth;
pub mod storage;
pub mod validation;

pub use auth::{AuthError, AuthResult};
pub use storage::{StorageError, StorageResult};
pub use validation::ValidationError;

#[derive(Error, Debug)]
pub enum AppError {
    // Sends the browser to `login` with the message attached
    #[error("Authentication error: {message}")]
    Auth { login: String, message: String },

    #[error("Service error: {0}")]
    Service(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type AppResult<T> = Result<T, AppError>;
