use std::time::Duration;

use anyhow::Context;
use argon2::{Argon2, PasswordVerifier};
use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use password_hash::PasswordHash;

use super::{error::ApiError, state::AppState};
use crate::db::Session;

/// Cookie carrying the opaque session token.
pub const SESSION_COOKIE: &str = "adminSession";
pub const LOGIN_PATH: &str = "/admin/login";

/// Injected into handlers after the session cookie was matched against a live session row.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl<S> FromRequestParts<S> for AdminSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let st = AppState::from_ref(state);
        lookup_session(&st, &jar)
            .await
            .map(AdminSession)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Resolve the session named by the cookie jar. Lookup failures count as logged out.
pub async fn lookup_session(state: &AppState, jar: &CookieJar) -> Option<Session> {
    let token = jar.get(SESSION_COOKIE)?.value();
    if !is_well_formed_token(token) {
        return None;
    }

    match state.repo.find_session(token).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("session lookup failed: {e:#}");
            None
        }
    }
}

fn is_well_formed_token(token: &str) -> bool {
    token.len() == 64 && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Everything under `/admin` except the login page needs a session.
///
/// The check runs on the path as the static file service resolves it, so
/// percent-encoded or doubled separators cannot sneak past. Paths with a `..`
/// segment are always gated.
pub fn is_gated_path(raw: &str) -> bool {
    let Some(segments) = resolved_segments(raw) else {
        return true;
    };
    match segments.as_slice() {
        [first, ..] if first == "admin" => segments != ["admin", "login"],
        _ => false,
    }
}

/// Percent-decoded, non-empty path segments. `None` if any segment is `..`.
fn resolved_segments(raw: &str) -> Option<Vec<String>> {
    let decoded = urlencoding::decode_binary(raw.as_bytes());
    String::from_utf8_lossy(&decoded)
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .map(|s| (s != "..").then(|| s.to_owned()))
        .collect()
}

/// Redirects unauthenticated requests for admin pages to the login page.
pub async fn admin_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Response {
    if !is_gated_path(req.uri().path()) {
        return next.run(req).await;
    }

    if lookup_session(&state, &jar).await.is_some() {
        next.run(req).await
    } else {
        tracing::debug!("no session for {}, redirecting to login", req.uri().path());
        Redirect::temporary(LOGIN_PATH).into_response()
    }
}

pub fn session_cookie(token: String, ttl: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(cookie::time::Duration::seconds(
            i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        ))
        .build()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Runs the Argon2 check on the blocking pool.
pub async fn verify_admin_password(hash: &str, candidate: &str) -> anyhow::Result<bool> {
    let hash = hash.to_owned();
    let candidate = candidate.to_owned();
    tokio::task::spawn_blocking(move || verify_secret(&candidate, &hash))
        .await
        .context("password verification task failed")
}

fn verify_secret(secret: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}
