use axum::{
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};

use crate::{auth::is_htmx, models::CurrentSession, AppState};

fn leaves_sell_flow(method: &Method, path: &str, htmx: bool) -> bool {
    // Only full page loads count as navigation; htmx partials (balance
    // refresh, quotes) happen while the wizard is on screen.
    *method == Method::GET
        && !htmx
        && path != "/sell"
        && !path.starts_with("/sell/")
        && !path.starts_with("/static/")
        && path != "/events"
        && path != "/favicon.ico"
}

/// Drops the session's sell wizard when the user navigates elsewhere.
pub async fn discard_on_navigation(
    State(state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let leaving = leaves_sell_flow(req.method(), req.uri().path(), is_htmx(req.headers()));
    let token = req
        .extensions()
        .get::<CurrentSession>()
        .map(|s| s.token.clone());

    if let (true, Some(token)) = (leaving, token) {
        if state.wizards.discard(&token).await {
            tracing::debug!("sell wizard discarded on navigation");
        }
    }

    next.run(req).await
}
