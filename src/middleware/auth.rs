use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{models::CurrentSession, AppState};

pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    for part in raw.split(';') {
        let part = part.trim();
        let mut it = part.splitn(2, '=');
        let Some(k) = it.next() else { continue };
        let Some(v) = it.next() else { continue };
        if k.trim() == name {
            return Some(v.trim().to_string());
        }
    }
    None
}

pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn accepts_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/event-stream"))
        .unwrap_or(false)
}

/// Puts the session token from the cookie into request extensions.
/// The token is not checked here: the wallet API answers 401 for a bad one
/// and the controllers log the user out then.
pub async fn inject_session(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let cookie_name = state.settings.session_cookie_name.as_str();

    if let Some(token) = get_cookie(req.headers(), cookie_name).filter(|t| !t.is_empty()) {
        req.extensions_mut().insert(CurrentSession { token });
    }

    next.run(req).await
}

pub fn is_public_path(path: &str) -> bool {
    path == "/"
        || path == "/login"
        || path == "/logout"
        || path == "/health"
        || path == "/favicon.ico"
        || path.starts_with("/static/")
}

/// Redirect to the login page, as a full redirect or an htmx one.
pub fn login_redirect(headers: &HeaderMap) -> Response {
    if is_htmx(headers) {
        let mut out = HeaderMap::new();
        out.insert("HX-Redirect", HeaderValue::from_static("/login"));
        return (StatusCode::OK, out, Html(String::new())).into_response();
    }

    Redirect::to("/login").into_response()
}

pub async fn require_auth(
    State(_state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if is_public_path(path) {
        return next.run(req).await;
    }

    if req.extensions().get::<CurrentSession>().is_some() {
        return next.run(req).await;
    }

    // Not logged in:
    // - SSE: 401
    // - HTMX: HX-Redirect to /login
    // - Normal: redirect to /login
    if accepts_event_stream(req.headers()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    login_redirect(req.headers())
}
