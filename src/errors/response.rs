use axum::{
    response::{IntoResponse, Response, Redirect},
    http::StatusCode,
};
use urlencoding;
use crate::errors::{AppError, AuthError};

// The IntoResponse trait implementation converts AppError into a well-formed HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Authentication errors send the browser back to the login page
            AppError::Auth { login, message } => {
                Redirect::to(&format!("{}?error={}", login, urlencoding::encode(&message)))
                    .into_response()
            }

            AppError::Service(err) => convert_auth_error(err),

            AppError::Storage(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Storage error: {}", e)
            ).into_response(),
        }
    }
}

fn convert_auth_error(err: AuthError) -> Response {
    match err {
        AuthError::Rejected(_) => (
            StatusCode::BAD_REQUEST,
            err.to_string()
        ).into_response(),

        AuthError::Http(e) => (
            StatusCode::BAD_GATEWAY,
            format!("Authentication service unavailable: {}", e)
        ).into_response(),

        AuthError::Unavailable(msg) => (
            StatusCode::BAD_GATEWAY,
            format!("Authentication service unavailable: {}", msg)
        ).into_response(),

        AuthError::InvalidResponse(msg) => (
            StatusCode::BAD_GATEWAY,
            format!("Invalid authentication service response: {}", msg)
        ).into_response(),
    }
}
