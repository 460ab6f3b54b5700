use axum::{
    extract::{Form, State},
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tower_sessions::Session;
use crate::errors::AppResult;
use crate::handlers::account::load_logs;
use crate::handlers::context::PageContext;
use crate::models::{HeaderDeleteForm, LogoutForm, LogoutTarget};
use crate::state::AppState;

pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Form(form): Form<LogoutForm>,
) -> AppResult<Response> {
    let ctx = PageContext::build(&state, session, jar).await;
    let header = ctx.header();
    header.open_logout_dialog();
    match form.target {
        LogoutTarget::Home => header.logout_to_home().await,
        LogoutTarget::Login => header.logout_to_login().await,
    }
    ctx.respond(None)
}

pub async fn delete_account(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Form(form): Form<HeaderDeleteForm>,
) -> AppResult<Response> {
    let ctx = PageContext::build(&state, session, jar).await;
    let header = ctx.header();
    header.show_delete_confirmation();
    header.set_delete_password(&form.password);

    let outcome = header.confirm_delete_account().await;
    if outcome.success {
        return ctx.respond(None);
    }

    // Back to the page the dialog lives on, confirmation view still showing
    let page = ctx.account_page();
    load_logs(&page).await;
    let body = ctx.render_account(&header, &page);
    ctx.respond(Some(body))
}

pub async fn menu_account(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> AppResult<Response> {
    let ctx = PageContext::build(&state, session, jar).await;
    ctx.header().go_to_account();
    ctx.respond(None)
}

pub async fn menu_home(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> AppResult<Response> {
    let ctx = PageContext::build(&state, session, jar).await;
    ctx.header().go_home();
    ctx.respond(None)
}

pub async fn menu_help(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> AppResult<Response> {
    let ctx = PageContext::build(&state, session, jar).await;
    ctx.header().help();
    ctx.respond(None)
}
