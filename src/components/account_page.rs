use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use crate::components::activity::{activity_color, activity_icon};
use crate::components::html::{escape, fill, when};
use crate::config::RoutesConfig;
use crate::errors::{AuthResult, ValidationError};
use crate::models::{ActivityLogEntry, User};
use crate::services::{AuthService, Navigator};

pub const DELETE_CONFIRMATION_PHRASE: &str = "DELETE";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete account";

const ACCOUNT_TEMPLATE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/account.html"));

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LogsState {
    #[default]
    NotLoaded,
    Loading,
    Loaded(Vec<ActivityLogEntry>),
}

impl LogsState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LogsState::Loading)
    }

    pub fn entries(&self) -> &[ActivityLogEntry] {
        match self {
            LogsState::Loaded(logs) => logs,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePhase {
    #[default]
    Idle,
    DialogOpen,
    Submitting,
    Deleted,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteDialogState {
    pub phase: DeletePhase,
    pub password: String,
    pub confirmation: String,
    pub error: Option<String>,
}

impl DeleteDialogState {
    pub fn is_open(&self) -> bool {
        matches!(self.phase, DeletePhase::DialogOpen | DeletePhase::Submitting)
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == DeletePhase::Submitting
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountPageState {
    pub logs: LogsState,
    pub delete: DeleteDialogState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Invalid(ValidationError),
    Deleted,
    Failed(String),
    // Dialog not open, already submitting, or page gone
    Ignored,
}

pub fn validate_delete_request(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if confirmation != DELETE_CONFIRMATION_PHRASE {
        return Err(ValidationError::ConfirmationMismatch);
    }
    Ok(())
}

/// Profile summary, activity log and the guarded delete-account dialog.
///
/// Work started by the page (the activity-log fetch, a pending deletion) is tied
/// to the page's lifetime: once [`AccountPage::unmount`] runs or the page is
/// dropped, late results are discarded instead of being written back.
pub struct AccountPage {
    auth: Arc<dyn AuthService>,
    navigator: Arc<dyn Navigator>,
    routes: RoutesConfig,
    state: Arc<Mutex<AccountPageState>>,
    lifetime: CancellationToken,
}

impl AccountPage {
    pub fn new(
        auth: Arc<dyn AuthService>,
        navigator: Arc<dyn Navigator>,
        routes: RoutesConfig,
    ) -> Self {
        Self {
            auth,
            navigator,
            routes,
            state: Arc::new(Mutex::new(AccountPageState::default())),
            lifetime: CancellationToken::new(),
        }
    }

    // Starts the one-off activity-log fetch
    pub fn mount(&self) -> JoinHandle<()> {
        set_state(&self.state, |s| s.logs = LogsState::Loading);
        let auth = self.auth.clone();
        let state = self.state.clone();
        let lifetime = self.lifetime.clone();
        tokio::spawn(async move {
            fetch_activity_logs(auth, state, lifetime).await;
        })
    }

    pub async fn load_activity_logs(&self) {
        set_state(&self.state, |s| s.logs = LogsState::Loading);
        fetch_activity_logs(self.auth.clone(), self.state.clone(), self.lifetime.clone()).await;
    }

    pub fn unmount(&self) {
        tracing::debug!("Account page unmounted");
        self.lifetime.cancel();
    }

    pub fn snapshot(&self) -> AccountPageState {
        lock(&self.state).clone()
    }

    pub fn user(&self) -> Option<User> {
        self.auth.current_user()
    }

    pub fn open_delete_dialog(&self) {
        set_state(&self.state, |s| {
            if s.delete.phase == DeletePhase::Idle {
                s.delete.phase = DeletePhase::DialogOpen;
            }
        });
    }

    pub fn close_delete_dialog(&self) {
        set_state(&self.state, |s| {
            if s.delete.phase == DeletePhase::DialogOpen {
                s.delete.phase = DeletePhase::Idle;
            }
        });
    }

    pub fn set_delete_password(&self, password: &str) {
        set_state(&self.state, |s| s.delete.password = password.to_string());
    }

    pub fn set_delete_confirmation(&self, confirmation: &str) {
        set_state(&self.state, |s| s.delete.confirmation = confirmation.to_string());
    }

    pub fn change_password(&self) {
        self.navigator.navigate(&self.routes.change_password);
    }

    pub async fn submit_delete(&self) -> DeleteOutcome {
        let checked = set_state(&self.state, |s| {
            if s.delete.phase != DeletePhase::DialogOpen {
                return Err(DeleteOutcome::Ignored);
            }
            s.delete.error = None;
            if let Err(e) = validate_delete_request(&s.delete.password, &s.delete.confirmation) {
                s.delete.error = Some(e.to_string());
                return Err(DeleteOutcome::Invalid(e));
            }
            s.delete.phase = DeletePhase::Submitting;
            Ok(s.delete.password.clone())
        });
        let password = match checked {
            Ok(password) => password,
            Err(outcome) => return outcome,
        };

        tracing::info!("Submitting account deletion");
        let result = self.auth.delete_account(&password).await;
        if self.lifetime.is_cancelled() {
            tracing::debug!("Account page gone before deletion finished; dropping result");
            return DeleteOutcome::Ignored;
        }

        match result {
            Ok(()) => {
                set_state(&self.state, |s| {
                    s.delete.phase = DeletePhase::Deleted;
                    s.delete.password.clear();
                });
                tracing::info!("Account deleted, leaving for {}", self.routes.login);
                self.navigator.navigate(&self.routes.login);
                DeleteOutcome::Deleted
            }
            Err(e) => {
                tracing::warn!("Account deletion failed: {}", e);
                let message = e.service_message().unwrap_or(DELETE_FAILED_MESSAGE).to_string();
                set_state(&self.state, |s| {
                    s.delete.phase = DeletePhase::DialogOpen;
                    s.delete.error = Some(message.clone());
                });
                DeleteOutcome::Failed(message)
            }
        }
    }

    pub fn render(&self) -> String {
        let state = self.snapshot();
        let user = self.user().unwrap_or_default();
        let account_path = escape(&self.routes.account);
        let display_name = escape(user.display_name());
        let username = escape(user.username.as_deref().unwrap_or(""));
        let email = escape(user.email.as_deref().unwrap_or(""));
        let created_on = user.created_on();
        let activity = render_activity(&state.logs);
        let delete_dialog = render_delete_dialog(&state.delete, &account_path);

        fill(
            ACCOUNT_TEMPLATE,
            &[
                ("display_name", display_name.as_str()),
                ("username", username.as_str()),
                ("email", email.as_str()),
                ("created_on", created_on.as_str()),
                ("activity", activity.as_str()),
                ("account_path", account_path.as_str()),
                ("delete_dialog", delete_dialog.as_str()),
            ],
        )
    }
}

impl Drop for AccountPage {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

async fn fetch_activity_logs(
    auth: Arc<dyn AuthService>,
    state: Arc<Mutex<AccountPageState>>,
    lifetime: CancellationToken,
) {
    tokio::select! {
        _ = lifetime.cancelled() => {
            tracing::debug!("Activity log fetch cancelled");
        }
        result = auth.get_activity_logs() => {
            if !lifetime.is_cancelled() {
                apply_activity_logs(&state, result);
            }
        }
    }
}

fn apply_activity_logs(state: &Mutex<AccountPageState>, result: AuthResult<Vec<ActivityLogEntry>>) {
    let logs = match result {
        Ok(logs) => {
            tracing::debug!("Loaded {} activity log entries", logs.len());
            logs
        }
        Err(e) => {
            tracing::warn!("Failed to load activity logs: {}", e);
            Vec::new()
        }
    };
    set_state(state, |s| s.logs = LogsState::Loaded(logs));
}

fn lock(state: &Mutex<AccountPageState>) -> MutexGuard<'_, AccountPageState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn set_state<R>(state: &Mutex<AccountPageState>, f: impl FnOnce(&mut AccountPageState) -> R) -> R {
    f(&mut lock(state))
}

fn render_activity(logs: &LogsState) -> String {
    if logs.is_loading() {
        return r#"<p class="activity-loading">Loading activity logs...</p>"#.to_string();
    }
    let entries = logs.entries();
    if entries.is_empty() {
        return r#"<p class="muted">No activity logs available</p>"#.to_string();
    }

    let items = entries.iter().enumerate().map(|(index, log)| {
        let details = log
            .details_json()
            .map(|json| {
                format!(r#"<small class="muted activity-details">{}</small>"#, escape(&json))
            })
            .unwrap_or_default();
        format!(
            r#"<li class="activity-item{}" data-id="{}">
                <div class="activity-primary">
                    <span class="activity-icon">{}</span>
                    <span class="activity-label">{}</span>
                    <span class="chip chip-{}">{}</span>
                </div>
                <div class="activity-secondary">
                    <small>{}</small>
                    {}
                </div>
            </li>"#,
            when(index + 1 != entries.len(), " divider"),
            escape(&log.id),
            activity_icon(&log.activity),
            escape(&log.label()),
            activity_color(&log.activity).as_str(),
            escape(&log.activity),
            log.timestamp.format("%Y-%m-%d %H:%M:%S"),
            details
        )
    }).collect::<Vec<_>>().join("\n");

    format!(r#"<ul class="activity-list">{}</ul>"#, items)
}

fn render_delete_dialog(dialog: &DeleteDialogState, account_path: &str) -> String {
    if !dialog.is_open() {
        return String::new();
    }
    let submitting = dialog.is_submitting();
    let disabled = when(submitting, "disabled");
    let error = dialog
        .error
        .as_deref()
        .map(|e| format!(r#"<div class="alert alert-error" role="alert">{}</div>"#, escape(e)))
        .unwrap_or_default();

    format!(
        r#"<div class="dialog-backdrop">
    <form class="dialog" method="post" action="{path}/delete">
        <h2>Delete Account</h2>
        <p>This action cannot be undone. This will permanently delete your account and remove all your data.</p>
        {error}
        <label>Enter your password
            <input type="password" name="password" {disabled}>
        </label>
        <label>Type "DELETE" to confirm
            <input type="text" name="confirmation" value="{confirmation}" {disabled}>
        </label>
        <small class="helper">Please type DELETE in capital letters</small>
        <div class="dialog-actions">
            <a class="button" href="{path}" {cancel}>Cancel</a>
            <button type="submit" class="button danger" {disabled}>{label}</button>
        </div>
    </form>
</div>"#,
        path = account_path,
        error = error,
        disabled = disabled,
        confirmation = escape(&dialog.confirmation),
        cancel = when(submitting, r#"aria-disabled="true""#),
        label = if submitting { "Deleting..." } else { "Delete Account" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AuthError, AuthResult};
    use crate::services::{InMemoryAuthService, Navigation, NavigationRecorder, DEMO_PASSWORD};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn page_with(service: Arc<InMemoryAuthService>) -> (AccountPage, Arc<NavigationRecorder>) {
        let navigator = Arc::new(NavigationRecorder::new());
        let page = AccountPage::new(service, navigator.clone(), RoutesConfig::default());
        (page, navigator)
    }

    // Answers nothing until released
    struct GatedAuthService {
        gate: Notify,
        delete_result: Mutex<Option<AuthResult<()>>>,
    }

    impl GatedAuthService {
        fn new(delete_result: AuthResult<()>) -> Self {
            Self { gate: Notify::new(), delete_result: Mutex::new(Some(delete_result)) }
        }
    }

    #[async_trait]
    impl AuthService for GatedAuthService {
        fn current_user(&self) -> Option<User> {
            None
        }

        async fn get_activity_logs(&self) -> AuthResult<Vec<ActivityLogEntry>> {
            std::future::pending().await
        }

        async fn delete_account(&self, _password: &str) -> AuthResult<()> {
            self.gate.notified().await;
            self.delete_result.lock().unwrap().take().unwrap_or(Ok(()))
        }

        async fn logout(&self) -> AuthResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn empty_password_never_reaches_service() {
        let service = Arc::new(InMemoryAuthService::demo());
        let (page, navigator) = page_with(service.clone());
        page.open_delete_dialog();
        page.set_delete_confirmation("DELETE");

        let outcome = page.submit_delete().await;

        assert_eq!(outcome, DeleteOutcome::Invalid(ValidationError::PasswordRequired));
        assert_eq!(service.delete_calls(), 0);
        let state = page.snapshot();
        assert_eq!(state.delete.error.as_deref(), Some("Password is required"));
        assert!(state.delete.is_open());
        assert!(navigator.history().is_empty());
    }

    #[tokio::test]
    async fn confirmation_must_match_exactly() {
        let service = Arc::new(InMemoryAuthService::demo());
        let (page, _) = page_with(service.clone());
        page.open_delete_dialog();
        page.set_delete_password(DEMO_PASSWORD);

        for attempt in ["", "delete", "Delete", "DELETE ", " DELETE", "DELET"] {
            page.set_delete_confirmation(attempt);
            let outcome = page.submit_delete().await;
            assert_eq!(outcome, DeleteOutcome::Invalid(ValidationError::ConfirmationMismatch));
            assert_eq!(
                page.snapshot().delete.error.as_deref(),
                Some("Please type DELETE to confirm")
            );
        }
        assert_eq!(service.delete_calls(), 0);
    }

    #[tokio::test]
    async fn success_navigates_to_login_once() {
        let service = Arc::new(InMemoryAuthService::demo());
        let (page, navigator) = page_with(service.clone());
        page.open_delete_dialog();
        page.set_delete_password(DEMO_PASSWORD);
        page.set_delete_confirmation("DELETE");

        assert_eq!(page.submit_delete().await, DeleteOutcome::Deleted);

        assert_eq!(navigator.history(), vec![Navigation::Route("/music-connect/login".into())]);
        assert_eq!(page.snapshot().delete.phase, DeletePhase::Deleted);
        assert_eq!(service.delete_calls(), 1);

        // A deleted account cannot be submitted again
        assert_eq!(page.submit_delete().await, DeleteOutcome::Ignored);
        assert_eq!(navigator.history().len(), 1);
    }

    #[tokio::test]
    async fn service_error_keeps_dialog_open_and_retryable() {
        let service = Arc::new(InMemoryAuthService::demo().rejecting_delete(Some("X")));
        let (page, navigator) = page_with(service.clone());
        page.open_delete_dialog();
        page.set_delete_password("secret");
        page.set_delete_confirmation("DELETE");

        assert_eq!(page.submit_delete().await, DeleteOutcome::Failed("X".into()));
        let state = page.snapshot();
        assert_eq!(state.delete.phase, DeletePhase::DialogOpen);
        assert_eq!(state.delete.error.as_deref(), Some("X"));
        assert!(!state.delete.is_submitting());
        assert!(navigator.history().is_empty());

        assert_eq!(page.submit_delete().await, DeleteOutcome::Failed("X".into()));
        assert_eq!(service.delete_calls(), 2);
        assert!(!page.render().contains("Deleting..."));
    }

    #[tokio::test]
    async fn missing_service_message_uses_fallback() {
        let service = Arc::new(InMemoryAuthService::demo().rejecting_delete(None));
        let (page, _) = page_with(service);
        page.open_delete_dialog();
        page.set_delete_password("secret");
        page.set_delete_confirmation("DELETE");

        assert_eq!(page.submit_delete().await, DeleteOutcome::Failed(DELETE_FAILED_MESSAGE.into()));
    }

    #[tokio::test]
    async fn unreachable_service_uses_fallback_and_stays_open() {
        let service = Arc::new(InMemoryAuthService::demo().failing_delete("connection refused"));
        let (page, navigator) = page_with(service.clone());
        page.open_delete_dialog();
        page.set_delete_password(DEMO_PASSWORD);
        page.set_delete_confirmation("DELETE");

        assert_eq!(page.submit_delete().await, DeleteOutcome::Failed(DELETE_FAILED_MESSAGE.into()));

        let state = page.snapshot();
        assert_eq!(state.delete.phase, DeletePhase::DialogOpen);
        assert_eq!(state.delete.error.as_deref(), Some(DELETE_FAILED_MESSAGE));
        assert!(navigator.history().is_empty());
        assert!(page.user().is_some());
        assert!(page.render().contains(DELETE_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn dialog_cannot_close_or_resubmit_while_submitting() {
        let service =
            Arc::new(GatedAuthService::new(Err(AuthError::Rejected(Some("busy".into())))));
        let navigator = Arc::new(NavigationRecorder::new());
        let page = Arc::new(AccountPage::new(service.clone(), navigator, RoutesConfig::default()));
        page.open_delete_dialog();
        page.set_delete_password("secret");
        page.set_delete_confirmation("DELETE");

        let pending = {
            let page = page.clone();
            tokio::spawn(async move { page.submit_delete().await })
        };
        while !page.snapshot().delete.is_submitting() {
            tokio::task::yield_now().await;
        }

        page.close_delete_dialog();
        assert!(page.snapshot().delete.is_open());
        assert_eq!(page.submit_delete().await, DeleteOutcome::Ignored);
        assert!(page.render().contains("Deleting..."));

        service.gate.notify_one();
        assert_eq!(pending.await.unwrap(), DeleteOutcome::Failed("busy".into()));
        page.close_delete_dialog();
        assert_eq!(page.snapshot().delete.phase, DeletePhase::Idle);
    }

    #[tokio::test]
    async fn mount_loads_logs_once() {
        let service = Arc::new(InMemoryAuthService::demo());
        let (page, _) = page_with(service.clone());

        page.mount().await.unwrap();

        assert_eq!(service.activity_log_calls(), 1);
        assert_eq!(page.snapshot().logs.entries().len(), 3);
        let html = page.render();
        assert!(html.contains("LOGIN SUCCESS"));
        assert!(html.contains("chip-error"));
        assert!(!html.contains("Loading activity logs..."));
    }

    #[tokio::test]
    async fn failed_log_fetch_shows_empty_state() {
        let service = Arc::new(InMemoryAuthService::demo().failing_activity_logs("down"));
        let (page, _) = page_with(service);

        page.load_activity_logs().await;

        assert_eq!(page.snapshot().logs, LogsState::Loaded(Vec::new()));
        assert!(page.render().contains("No activity logs available"));
    }

    #[tokio::test]
    async fn unmount_cancels_pending_fetch() {
        let service = Arc::new(GatedAuthService::new(Ok(())));
        let navigator = Arc::new(NavigationRecorder::new());
        let page = AccountPage::new(service, navigator, RoutesConfig::default());

        let handle = page.mount();
        assert!(page.render().contains("Loading activity logs..."));

        page.unmount();
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("fetch should stop after unmount")
            .unwrap();
        assert!(page.snapshot().logs.is_loading());
    }

    #[tokio::test]
    async fn render_shows_profile_and_escapes() {
        let user = User {
            username: Some("<bob>".into()),
            full_name: None,
            email: Some("bob@example.com".into()),
            created_at: None,
        };
        let service = Arc::new(InMemoryAuthService::new(user, "pw"));
        let (page, navigator) = page_with(service);

        let html = page.render();
        assert!(html.contains("@&lt;bob&gt;"));
        assert!(html.contains("Account created: N/A"));
        assert!(!html.contains("Type \"DELETE\" to confirm"));

        page.open_delete_dialog();
        assert!(page.render().contains("Type \"DELETE\" to confirm"));

        page.change_password();
        assert_eq!(navigator.last(), Some(Navigation::Route("/forgot-password".into())));
    }
}
