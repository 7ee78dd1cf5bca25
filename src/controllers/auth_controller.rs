use axum::{
    extract::{Extension, Form, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::is_htmx,
    models::CurrentSession,
    render,
    services::auth_service,
    AppState,
};

use super::support::redirect_to;

fn is_valid_email(email: &str) -> bool {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

// ---------------- LOGIN ----------------

pub async fn get_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Option<Extension<CurrentSession>>,
) -> Response {
    if session.is_some() {
        return redirect_to(&headers, "/");
    }

    let body = render::render_partial(&state, "pages/login", &json!({}));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    match render::render_full(&state, "Login", body, None) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

#[derive(Deserialize)]
pub struct LoginForm {
    // username or email, whichever the account was created with
    pub username: String,
    pub password: String,
}

fn login_form_response(state: &AppState, username: &str, errors: serde_json::Map<String, serde_json::Value>) -> Response {
    let html = render::render_partial(
        state,
        "pages/login",
        &json!({
            "values": {"username": username},
            "errors": errors
        }),
    );
    (StatusCode::OK, Html(html)).into_response()
}

pub async fn post_login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let username = form.username.trim().to_string();
    // sent as typed; spaces can be part of a password
    let password = form.password;

    let mut errors = serde_json::Map::new();

    if username.is_empty() {
        errors.insert("username".into(), json!("Username or email is required."));
    } else if username.contains('@') && !is_valid_email(&username) {
        errors.insert("username".into(), json!("Invalid email."));
    }

    if password.trim().is_empty() {
        errors.insert("password".into(), json!("Password is required."));
    }

    if !errors.is_empty() {
        return login_form_response(&state, &username, errors);
    }

    let token = match auth_service::login_user(&state, &username, &password).await {
        Ok(t) => t,
        Err(errs) => {
            for (k, v) in errs {
                errors.insert(k, json!(v));
            }
            return login_form_response(&state, &username, errors);
        }
    };

    tracing::info!("user logged in");
    let jar = jar.add(auth_service::session_cookie(&state, token));
    (jar, redirect_to(&headers, "/")).into_response()
}

// ---------------- LOGOUT ----------------

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Option<Extension<CurrentSession>>,
) -> impl IntoResponse {
    if let Some(Extension(s)) = session {
        auth_service::end_session(&state, &s.token).await;
    }
    let jar = jar.add(auth_service::clear_session_cookie(&state));
    (jar, (StatusCode::SEE_OTHER, [("Location", "/login")]))
}
