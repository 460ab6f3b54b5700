use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    // Service answered with success: false
    #[error("{}", .0.as_deref().unwrap_or("Request rejected by authentication service"))]
    Rejected(Option<String>),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected response from authentication service: {0}")]
    InvalidResponse(String),
}

impl AuthError {
    // The message the service itself supplied, if any
    pub fn service_message(&self) -> Option<&str> {
        match self {
            AuthError::Rejected(Some(msg)) if !msg.is_empty() => Some(msg),
            _ => None,
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
