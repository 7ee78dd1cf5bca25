use std::collections::HashMap;

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::{error::ApiError, AppState};

pub type FieldErrors = HashMap<String, String>;

pub fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(state.settings.session_cookie_name.clone(), token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if state.settings.cookie_secure {
        cookie.set_secure(true);
    }
    cookie
}

pub fn clear_session_cookie(state: &AppState) -> Cookie<'static> {
    let mut cookie = Cookie::new(state.settings.session_cookie_name.clone(), "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.make_removal();
    cookie
}

/// Asks the wallet API for a token. Credential problems come back as form
/// errors, everything else as a `_form` message.
pub async fn login_user(state: &AppState, username: &str, password: &str) -> Result<String, FieldErrors> {
    let mut errs: FieldErrors = HashMap::new();

    match state.api.login(username, password).await {
        Ok(token) => Ok(token),
        Err(ApiError::Unauthorized) | Err(ApiError::Forbidden) => {
            errs.insert("_form".into(), "Invalid username or password.".into());
            Err(errs)
        }
        Err(ApiError::Status { status, .. }) if status.as_u16() == 400 => {
            errs.insert("_form".into(), "Invalid username or password.".into());
            Err(errs)
        }
        Err(e) => {
            tracing::error!(error = %e, "login request failed");
            errs.insert("_form".into(), e.user_message());
            Err(errs)
        }
    }
}

/// Drops everything this server keeps for the session.
pub async fn end_session(state: &AppState, token: &str) {
    state.wizards.discard(token).await;
    state.quotes.forget_session(token);
}
