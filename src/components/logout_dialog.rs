use crate::components::html::{escape, when};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutAction {
    ToHome,
    ToLogin,
    DeleteAccount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogView {
    #[default]
    Options,
    ConfirmDelete,
}

// What a dialog action reports back to the dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl ActionOutcome {
    pub fn succeeded() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(error: Option<String>) -> Self {
        Self { success: false, error }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogoutDialogState {
    pub open: bool,
    pub view: DialogView,
    pub password: String,
    pub error: Option<String>,
    // Several actions may run at once unless the header enforces exclusion
    pub in_flight: Vec<LogoutAction>,
}

impl LogoutDialogState {
    pub fn open(&mut self) {
        self.open = true;
        self.view = DialogView::Options;
        self.error = None;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.view = DialogView::Options;
        self.password.clear();
        self.error = None;
    }

    pub fn show_delete_confirmation(&mut self) {
        self.open = true;
        self.view = DialogView::ConfirmDelete;
    }

    pub fn is_running(&self, action: LogoutAction) -> bool {
        self.in_flight.contains(&action)
    }

    pub fn start(&mut self, action: LogoutAction) {
        self.in_flight.push(action);
    }

    pub fn finish(&mut self, action: LogoutAction) {
        if let Some(pos) = self.in_flight.iter().position(|a| *a == action) {
            self.in_flight.remove(pos);
        }
    }
}

pub fn render(dialog: &LogoutDialogState, page_path: &str, exclusive: bool) -> String {
    if !dialog.open {
        return String::new();
    }
    let locked = exclusive && !dialog.in_flight.is_empty();
    let body = match dialog.view {
        DialogView::Options => render_options(page_path, locked),
        DialogView::ConfirmDelete => render_confirm_delete(dialog, page_path, locked),
    };

    format!(
        r#"<div class="dialog-backdrop">
    <div class="dialog logout-dialog" role="dialog">
        <h2>Log out</h2>
        {}
    </div>
</div>"#,
        body
    )
}

fn render_options(page_path: &str, locked: bool) -> String {
    let disabled = when(locked, "disabled");
    format!(
        r#"<p>How would you like to leave MusicConnect?</p>
        <form method="post" action="/logout">
            <input type="hidden" name="target" value="home">
            <button type="submit" class="button" {disabled}>Logout to home page</button>
        </form>
        <form method="post" action="/logout">
            <input type="hidden" name="target" value="login">
            <button type="submit" class="button" {disabled}>Logout to login page</button>
        </form>
        <a class="button danger" href="{path}?logout=delete" {aria}>Delete account</a>
        <div class="dialog-actions">
            <a class="button" href="{path}">Cancel</a>
        </div>"#,
        disabled = disabled,
        path = page_path,
        aria = when(locked, r#"aria-disabled="true""#),
    )
}

fn render_confirm_delete(dialog: &LogoutDialogState, page_path: &str, locked: bool) -> String {
    let deleting = dialog.is_running(LogoutAction::DeleteAccount);
    let error = dialog
        .error
        .as_deref()
        .map(|e| format!(r#"<div class="alert alert-error" role="alert">{}</div>"#, escape(e)))
        .unwrap_or_default();
    format!(
        r#"<p>This will permanently delete your account. Enter your password to continue.</p>
        {error}
        <form method="post" action="/logout/delete-account">
            <label>Password
                <input type="password" name="password" {disabled}>
            </label>
            <div class="dialog-actions">
                <a class="button" href="{path}?logout=options">Back</a>
                <button type="submit" class="button danger" {disabled}>{label}</button>
            </div>
        </form>"#,
        error = error,
        disabled = when(locked || deleting, "disabled"),
        path = page_path,
        label = if deleting { "Deleting..." } else { "Delete account" },
    )
}
