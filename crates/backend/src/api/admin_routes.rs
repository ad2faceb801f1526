use std::io;

use axum::{
    Form, Router,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::common::{
    ApiError, ApiResult, AppState, LOGIN_PATH, SESSION_COOKIE, expired_session_cookie,
    lookup_session, session_cookie, verify_admin_password,
};

const DASHBOARD_PATH: &str = "/admin";

/// Admin pages plus login/logout. Everything except the login page sits behind
/// [`admin_gate`](crate::common::admin_gate).
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(DASHBOARD_PATH, routing::get(dashboard))
        .route(LOGIN_PATH, routing::get(login_page).post(login_submit))
        .route("/admin/logout", routing::get(logout).post(logout))
        .route("/admin/{page}", routing::get(admin_page))
}

#[derive(Deserialize)]
pub struct LoginForm {
    password: String,
}

async fn login_page(State(state): State<AppState>, jar: CookieJar) -> ApiResult<Response> {
    if lookup_session(&state, &jar).await.is_some() {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }
    Ok(serve_page(&state, "login").await?.into_response())
}

async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> ApiResult<(CookieJar, Redirect)> {
    if !verify_admin_password(&state.auth.password_hash, &form.password).await? {
        tracing::warn!("failed admin login attempt");
        metrics::counter!("admin_login_failures_total").increment(1);
        return Ok((jar, Redirect::to("/admin/login?error=1")));
    }

    let session = state.repo.create_session(state.auth.session_ttl).await?;
    tracing::info!("admin logged in");

    let jar = jar.add(session_cookie(session.token, state.auth.session_ttl));
    Ok((jar, Redirect::to(DASHBOARD_PATH)))
}

async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) {
        if let Err(e) = state.repo.delete_session(&token).await {
            tracing::error!("failed to delete session: {e:#}");
        }
    }
    (jar.remove(expired_session_cookie()), Redirect::to(LOGIN_PATH))
}

async fn dashboard(State(state): State<AppState>) -> ApiResult<Html<String>> {
    serve_page(&state, "index").await
}

async fn admin_page(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> ApiResult<Html<String>> {
    serve_page(&state, &page).await
}

/// Admin pages live at `<public>/admin/<page>.html`.
async fn serve_page(state: &AppState, page: &str) -> ApiResult<Html<String>> {
    let valid = !page.is_empty()
        && page
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if !valid {
        return Err(ApiError::NotFound("no such page".into()));
    }

    let path = state
        .paths
        .public_dir
        .join("admin")
        .join(format!("{page}.html"));
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Ok(Html(html)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ApiError::NotFound("no such page".into()))
        }
        Err(e) => Err(ApiError::Internal(
            anyhow::Error::new(e).context(format!("reading {}", path.display())),
        )),
    }
}
