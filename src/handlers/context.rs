use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tower_sessions::Session;
use crate::components::{html, AccountPage, Header};
use crate::config::RoutesConfig;
use crate::errors::AppResult;
use crate::models::{PageQuery, User};
use crate::services::{
    AuthService, BrowserStorage, CookieStore, KeyValueStore, Navigation, NavigationRecorder,
    SessionStore, TOKEN_KEY, USER_KEY,
};
use crate::state::AppState;

/// Everything one request needs to host the components: the browser's
/// credentials bound to an auth service, both storages and a navigator
/// whose last entry becomes the response's redirect.
pub struct PageContext {
    pub auth: Arc<dyn AuthService>,
    pub navigator: Arc<NavigationRecorder>,
    pub storage: BrowserStorage,
    pub routes: RoutesConfig,
    local: Arc<CookieStore>,
    exclusive_logout_actions: bool,
}

impl PageContext {
    pub async fn build(state: &AppState, session: Session, jar: CookieJar) -> Self {
        let config = &state.config;
        let local = Arc::new(CookieStore::new(
            jar,
            config.storage.local_prefix.clone(),
            config.storage.secure_cookies,
        ));

        let token = match local.get(TOKEN_KEY).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Failed to read stored token: {}", e);
                None
            }
        };
        let user = stored_user(local.as_ref()).await;

        Self {
            auth: state.auth.connect(token, user),
            navigator: Arc::new(NavigationRecorder::new()),
            storage: BrowserStorage::new(Arc::new(SessionStore::new(session)), local.clone()),
            routes: config.routes.clone(),
            local,
            exclusive_logout_actions: config.header.exclusive_logout_actions,
        }
    }

    pub fn header(&self) -> Header {
        Header::new(
            self.auth.clone(),
            self.navigator.clone(),
            self.storage.clone(),
            self.routes.clone(),
            self.exclusive_logout_actions,
        )
    }

    pub fn account_page(&self) -> AccountPage {
        AccountPage::new(self.auth.clone(), self.navigator.clone(), self.routes.clone())
    }

    // Full document for the account page with its header
    pub fn render_account(&self, header: &Header, page: &AccountPage) -> String {
        let header = header.render(&self.routes.account);
        html::layout("My Account", &header, &page.render())
    }

    /// Turns the outcome of a request into a response. A pending navigation
    /// wins over the body; storage changes always travel with it.
    pub fn respond(&self, body: Option<String>) -> AppResult<Response> {
        let jar = self.local.jar()?;
        let response = match self.navigator.last() {
            Some(Navigation::Route(path)) => (jar, Redirect::to(&path)).into_response(),
            // Hard redirects must not be served from cache on the way back
            Some(Navigation::Redirect(url)) => {
                (jar, [(header::CACHE_CONTROL, "no-store")], Redirect::to(&url)).into_response()
            }
            None => match body {
                Some(body) => (jar, Html(body)).into_response(),
                None => (jar, StatusCode::NO_CONTENT).into_response(),
            },
        };
        Ok(response)
    }
}

async fn stored_user(local: &dyn KeyValueStore) -> Option<User> {
    let raw = match local.get(USER_KEY).await {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!("Failed to read stored user: {}", e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!("Ignoring malformed stored user: {}", e);
            None
        }
    }
}

// Open the overlays requested in the query string
pub fn apply_overlays(query: &PageQuery, header: &Header, page: &AccountPage) {
    if query.menu.as_deref() == Some("open") {
        header.open_menu();
    }
    match query.logout.as_deref() {
        Some("options") => header.open_logout_dialog(),
        Some("delete") => header.show_delete_confirmation(),
        _ => {}
    }
    if query.dialog.as_deref() == Some("delete") {
        page.open_delete_dialog();
    }
}
