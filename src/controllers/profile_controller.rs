use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde_json::json;

use crate::{models::CurrentSession, render, AppState};

use super::support::{api_failure, page, Retry};

pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    let profile = match state.api.profile(&session.token).await {
        Ok(p) => p,
        Err(e) => return api_failure(&state, &headers, &session, e, Retry::get("/profile")).await,
    };

    let body = render::render_partial(
        &state,
        "pages/profile",
        &json!({
            "display_name": profile.display_name(),
            "username": profile.username,
            "email": profile.email,
            "first_name": profile.first_name,
            "last_name": profile.last_name,
        }),
    );

    page(&state, &headers, Some(&session), "Profile", StatusCode::OK, body)
}
