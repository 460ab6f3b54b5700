use axum::{
    extract::{Form, Query, State},
    response::{IntoResponse, Json, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tower_sessions::Session;
use crate::components::{AccountPage, DeleteOutcome};
use crate::errors::AppResult;
use crate::handlers::context::{apply_overlays, PageContext};
use crate::models::{DeleteAccountForm, PageQuery};
use crate::state::AppState;

pub async fn show_account(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let ctx = PageContext::build(&state, session, jar).await;
    let header = ctx.header();
    let page = ctx.account_page();
    apply_overlays(&query, &header, &page);

    load_logs(&page).await;
    let body = ctx.render_account(&header, &page);
    ctx.respond(Some(body))
}

pub async fn delete_account(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Form(form): Form<DeleteAccountForm>,
) -> AppResult<Response> {
    let ctx = PageContext::build(&state, session, jar).await;
    let header = ctx.header();
    let page = ctx.account_page();
    page.open_delete_dialog();
    page.set_delete_password(&form.password);
    page.set_delete_confirmation(&form.confirmation);

    match page.submit_delete().await {
        DeleteOutcome::Deleted => ctx.respond(None),
        outcome => {
            tracing::debug!("Delete dialog stays open: {:?}", outcome);
            load_logs(&page).await;
            let body = ctx.render_account(&header, &page);
            ctx.respond(Some(body))
        }
    }
}

pub async fn change_password(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> AppResult<Response> {
    let ctx = PageContext::build(&state, session, jar).await;
    ctx.account_page().change_password();
    ctx.respond(None)
}

pub async fn activity_logs(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> AppResult<Response> {
    let ctx = PageContext::build(&state, session, jar).await;
    let logs = ctx.auth.get_activity_logs().await?;
    Ok(Json(logs).into_response())
}

// Runs the mount fetch to completion so the first render has the logs
pub(crate) async fn load_logs(page: &AccountPage) {
    if let Err(e) = page.mount().await {
        tracing::error!("Activity log fetch task failed: {}", e);
    }
}
