use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use crate::errors::{AppError, AppResult};
use crate::services::TOKEN_KEY;
use crate::state::AppState;

// Pages need a stored token; without one the browser goes to the login page
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request<Body>,
    next: Next,
) -> AppResult<Response> {
    let path = req.uri().path();

    // Logging out must always work, even with the token already gone
    if path == "/logout" || path.starts_with("/static/") || !state.auth.requires_token() {
        return Ok(next.run(req).await);
    }

    let token_cookie = format!("{}{}", state.config.storage.local_prefix, TOKEN_KEY);
    match jar.get(&token_cookie) {
        Some(token) if !token.value().is_empty() => Ok(next.run(req).await),
        _ => {
            tracing::info!("No stored token for {}, sending to login", path);
            Err(AppError::Auth {
                login: state.config.routes.login.clone(),
                message: "Please log in to continue".to_string(),
            })
        }
    }
}
