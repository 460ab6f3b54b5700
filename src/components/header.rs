use std::sync::{Arc, Mutex};
use crate::components::account_page::DELETE_FAILED_MESSAGE;
use crate::components::html::{escape, fill};
use crate::components::logout_dialog::{self, ActionOutcome, LogoutAction, LogoutDialogState};
use crate::config::RoutesConfig;
use crate::errors::{AuthError, ValidationError};
use crate::services::{AuthService, BrowserStorage, Navigator};

const HEADER_TEMPLATE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/header.html"));
const ACTION_IN_PROGRESS: &str = "Another logout action is already in progress";

#[derive(Debug, Clone, Default)]
pub struct HeaderState {
    pub menu_open: bool,
    pub dialog: LogoutDialogState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBadge {
    pub initial: char,
    pub name: String,
    pub email: String,
}

/// Navigation bar with the user menu and the logout dialog.
///
/// Logging out is best effort: whatever `logout()` returns, storage is cleared
/// and the browser is sent away. Deleting the account only leaves the page once
/// the service has confirmed it.
pub struct Header {
    auth: Arc<dyn AuthService>,
    navigator: Arc<dyn Navigator>,
    storage: BrowserStorage,
    routes: RoutesConfig,
    exclusive_actions: bool,
    state: Mutex<HeaderState>,
}

impl Header {
    pub fn new(
        auth: Arc<dyn AuthService>,
        navigator: Arc<dyn Navigator>,
        storage: BrowserStorage,
        routes: RoutesConfig,
        exclusive_actions: bool,
    ) -> Self {
        Self {
            auth,
            navigator,
            storage,
            routes,
            exclusive_actions,
            state: Mutex::new(HeaderState::default()),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut HeaderState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut state)
    }

    pub fn snapshot(&self) -> HeaderState {
        self.with_state(|s| s.clone())
    }

    pub fn user_badge(&self) -> UserBadge {
        let user = self.auth.current_user().unwrap_or_default();
        let username = user.username.filter(|name| !name.is_empty());
        let initial = username
            .as_deref()
            .and_then(|name| name.chars().next())
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('U');
        UserBadge {
            initial,
            name: username.unwrap_or_else(|| "User".to_string()),
            email: user.email.unwrap_or_default(),
        }
    }

    pub fn open_menu(&self) {
        self.with_state(|s| s.menu_open = true);
    }

    pub fn close_menu(&self) {
        self.with_state(|s| s.menu_open = false);
    }

    pub fn go_to_account(&self) {
        self.close_menu();
        self.navigator.navigate(&self.routes.account);
    }

    pub fn go_home(&self) {
        self.navigator.navigate(&self.routes.home);
    }

    pub fn help(&self) {
        tracing::info!("Help requested");
    }

    pub fn open_logout_dialog(&self) {
        tracing::debug!("Opening logout dialog");
        self.with_state(|s| {
            s.menu_open = false;
            s.dialog.open();
        });
    }

    pub fn close_logout_dialog(&self) {
        tracing::debug!("Closing logout dialog");
        self.with_state(|s| s.dialog.close());
    }

    pub fn show_delete_confirmation(&self) {
        self.with_state(|s| s.dialog.show_delete_confirmation());
    }

    pub fn set_delete_password(&self, password: &str) {
        self.with_state(|s| s.dialog.password = password.to_string());
    }

    pub async fn logout_to_home(&self) {
        tracing::info!("Logout to home requested");
        let target = self.routes.home.clone();
        self.logout_to(LogoutAction::ToHome, &target).await;
    }

    pub async fn logout_to_login(&self) {
        tracing::info!("Logout to login requested");
        let target = self.routes.login.clone();
        self.logout_to(LogoutAction::ToLogin, &target).await;
    }

    // Returns false when the action was refused because another one is running
    fn begin(&self, action: LogoutAction) -> bool {
        let exclusive = self.exclusive_actions;
        self.with_state(|s| {
            if exclusive && !s.dialog.in_flight.is_empty() {
                tracing::warn!(
                    "Ignoring {:?} while {:?} is in progress",
                    action,
                    s.dialog.in_flight
                );
                return false;
            }
            s.dialog.start(action);
            true
        })
    }

    async fn logout_to(&self, action: LogoutAction, target: &str) {
        if !self.begin(action) {
            return;
        }

        if let Err(e) = self.auth.logout().await {
            tracing::error!("Logout error: {}", e);
        }
        self.storage.clear_after_logout().await;

        self.with_state(|s| {
            s.dialog.finish(action);
            s.dialog.close();
        });
        self.navigator.redirect(target);
    }

    pub async fn delete_account(&self, password: &str) -> ActionOutcome {
        tracing::info!("Delete account requested from header");
        if !self.begin(LogoutAction::DeleteAccount) {
            return ActionOutcome::failed(Some(ACTION_IN_PROGRESS.to_string()));
        }

        let result = self.auth.delete_account(password).await;
        if result.is_ok() {
            self.storage.clear_all().await;
        }

        let outcome = self.with_state(|s| {
            s.dialog.finish(LogoutAction::DeleteAccount);
            match result {
                Ok(()) => {
                    s.dialog.close();
                    ActionOutcome::succeeded()
                }
                Err(AuthError::Rejected(error)) => ActionOutcome::failed(error),
                Err(e) => {
                    tracing::error!("Delete account error: {}", e);
                    ActionOutcome::failed(Some(DELETE_FAILED_MESSAGE.to_string()))
                }
            }
        });

        if outcome.success {
            self.navigator.redirect(&self.routes.login);
        }
        outcome
    }

    // Submit handler of the dialog's confirmation view
    pub async fn confirm_delete_account(&self) -> ActionOutcome {
        let password = self.with_state(|s| {
            s.dialog.error = None;
            s.dialog.password.clone()
        });

        let outcome = if password.is_empty() {
            ActionOutcome::failed(Some(ValidationError::PasswordRequired.to_string()))
        } else {
            self.delete_account(&password).await
        };

        if !outcome.success {
            let message = outcome
                .error
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DELETE_FAILED_MESSAGE.to_string());
            self.with_state(|s| {
                s.dialog.show_delete_confirmation();
                s.dialog.error = Some(message);
            });
        }
        outcome
    }

    pub fn render(&self, page_path: &str) -> String {
        let state = self.snapshot();
        let page_path = escape(page_path);
        let menu = if state.menu_open { self.render_menu(&page_path) } else { String::new() };
        let dialog = logout_dialog::render(&state.dialog, &page_path, self.exclusive_actions);

        fill(
            HEADER_TEMPLATE,
            &[
                ("page_path", page_path.as_str()),
                ("menu", menu.as_str()),
                ("logout_dialog", dialog.as_str()),
            ],
        )
    }

    fn render_menu(&self, page_path: &str) -> String {
        let badge = self.user_badge();
        format!(
            r#"<nav class="user-menu">
            <div class="user-menu-identity">
                <span class="avatar">{}</span>
                <div><strong>{}</strong><br><small class="muted">{}</small></div>
            </div>
            <form method="post" action="/menu/account">
                <button type="submit" class="menu-item">My Account</button>
            </form>
            <a class="menu-item error" href="{}?logout=options">Logout</a>
            <a class="menu-item" href="{}">Close</a>
        </nav>"#,
            escape(&badge.initial.to_string()),
            escape(&badge.name),
            escape(&badge.email),
            page_path,
            page_path
        )
    }
}
