mod account;
mod context;
mod header;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir};
use tower_sessions::cookie::SameSite;
use tower_sessions::{MemoryStore, SessionManagerLayer};
use crate::middleware;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();
    let account = config.routes.account.trim_end_matches('/').to_string();

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.storage.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_name("session");

    Router::new()
        // Account page
        .route(&account, get(account::show_account))
        .route(&format!("{}/delete", account), post(account::delete_account))
        .route(&format!("{}/change-password", account), post(account::change_password))
        .route(&format!("{}/activity-logs", account), get(account::activity_logs))

        // Header actions
        .route("/logout", post(header::logout))
        .route("/logout/delete-account", post(header::delete_account))
        .route("/menu/account", post(header::menu_account))
        .route("/menu/home", post(header::menu_home))
        .route("/menu/help", post(header::menu_help))

        // Static files
        .nest_service("/static", ServeDir::new(&config.server.static_dir))

        .layer(from_fn_with_state(state.clone(), middleware::require_auth))
        .layer(session_layer)
        .layer(RequestBodyLimitLayer::new(config.server.max_form_size))
        .with_state(state)
}
