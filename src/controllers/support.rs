use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::{
    auth::{is_htmx, login_redirect},
    error::ApiError,
    models::{CurrentSession, Direction, Order, QuoteInput},
    render,
    services::{
        auth_service, order_status,
        quote_service::{DraftKey, QuoteOutcome},
    },
    AppState,
};

pub fn fmt2(v: f64) -> String {
    format!("{:.2}", v)
}

pub fn fmt_btc(v: f64) -> String {
    format!("{:.8}", v)
}

pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

pub fn hx_trigger_value(events: &[&str]) -> HeaderValue {
    // HX-Trigger expects JSON: {"evt":true,...}
    let body = events
        .iter()
        .map(|ev| format!("\"{ev}\":true"))
        .collect::<Vec<_>>()
        .join(",");
    HeaderValue::from_str(&format!("{{{body}}}")).unwrap_or_else(|_| HeaderValue::from_static("{}"))
}

/// Full page for normal requests, bare body for htmx swaps.
pub fn page(
    state: &AppState,
    headers: &HeaderMap,
    session: Option<&CurrentSession>,
    title: &str,
    status: StatusCode,
    body: String,
) -> Response {
    if is_htmx(headers) {
        return (status, Html(body)).into_response();
    }

    match render::render_full(state, title, body, session) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

/// Redirect after a successful form post.
pub fn redirect_to(headers: &HeaderMap, path: &str) -> Response {
    if is_htmx(headers) {
        let mut out = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(path) {
            out.insert("HX-Redirect", v);
        }
        return (StatusCode::OK, out, Html(String::new())).into_response();
    }

    (StatusCode::SEE_OTHER, [("Location", path)], Html(String::new())).into_response()
}

/// Where an inline retry button sends the user.
pub struct Retry<'a> {
    pub url: &'a str,
    pub method: &'a str,
    // css selector of the form whose values get re-sent
    pub include: Option<&'a str>,
}

impl<'a> Retry<'a> {
    pub fn get(url: &'a str) -> Self {
        Self { url, method: "get", include: None }
    }

    pub fn post(url: &'a str, include: &'a str) -> Self {
        Self { url, method: "post", include: Some(include) }
    }
}

pub fn retry_snippet(state: &AppState, message: &str, retry: &Retry<'_>) -> String {
    render::render_partial(
        state,
        "partials/retry",
        &json!({
            "message": message,
            "url": retry.url,
            "method": retry.method,
            "include": retry.include,
        }),
    )
}

/// Turns a wallet API failure into what the user sees.
///
/// 401 ends the session and sends the user to login. Everything else is an
/// inline message with a retry button; nothing becomes a 500.
pub async fn api_failure(
    state: &AppState,
    headers: &HeaderMap,
    session: &CurrentSession,
    err: ApiError,
    retry: Retry<'_>,
) -> Response {
    if err.is_unauthorized() {
        tracing::info!("wallet API rejected session token; logging out");
        auth_service::end_session(state, &session.token).await;
        let jar = CookieJar::new().add(auth_service::clear_session_cookie(state));
        return (jar, login_redirect(headers)).into_response();
    }

    tracing::warn!(error = %err, url = retry.url, "wallet API call failed");
    let html = retry_snippet(state, &err.user_message(), &retry);
    page(state, headers, Some(session), "Something went wrong", StatusCode::OK, html)
}

/// Debounced quote for a form. A request overtaken by a newer one answers
/// 204 with `HX-Reswap: none` so the page keeps the fresher quote.
///
/// `input` is `None` when the form has nothing quotable yet. That still
/// counts as a change and supersedes every older request for the draft.
pub async fn quote_response(
    state: &AppState,
    headers: &HeaderMap,
    session: &CurrentSession,
    direction: Direction,
    input: Option<QuoteInput>,
    retry: Retry<'_>,
) -> Response {
    let key = DraftKey::new(&session.token, direction);

    let Some(input) = input.filter(|i| i.amount > 0.0) else {
        state.quotes.issue(key);
        let html = render::render_partial(state, "partials/quote", &json!({ "empty": true }));
        return (StatusCode::OK, Html(html)).into_response();
    };

    match state.quotes.request(key, &session.token, input).await {
        Ok(QuoteOutcome::Fresh(q)) => {
            let html = render::render_partial(
                state,
                "partials/quote",
                &json!({
                    "empty": false,
                    "amount": fmt2(q.amount),
                    "fee": fmt2(q.fee),
                    "total_amount": fmt2(q.total_amount),
                    "currency": q.currency,
                }),
            );
            (StatusCode::OK, Html(html)).into_response()
        }
        Ok(QuoteOutcome::Superseded) => {
            let mut out = HeaderMap::new();
            out.insert("HX-Reswap", HeaderValue::from_static("none"));
            (StatusCode::NO_CONTENT, out).into_response()
        }
        Err(e) => api_failure(state, headers, session, e, retry).await,
    }
}

pub fn order_json(o: &Order) -> serde_json::Value {
    let view = order_status::view_for(&o.status);

    json!({
        "id": o.id,
        "direction": o.direction.as_str(),
        "is_buy": o.direction == Direction::Buy,
        "status": o.status.as_str(),
        "status_label": o.status.label(),
        "tone": view.tone.css(),
        "icon": view.icon.glyph(),
        "panel": view.panel,
        "can_submit_proof": view.actions.contains(&order_status::OrderAction::SubmitPaymentProof),
        "amount": fmt2(o.amount),
        "fee": fmt2(o.fee),
        "total_amount": fmt2(o.total_amount),
        "currency": o.currency,
        "provider": o.provider,
        "payout_details": o.payout_details,
        "payment_proof": o.payment_proof,
        "txid": o.txid,
        "address": o.address,
        "created_at": o.created_at.as_deref().map(fmt_timestamp),
    })
}

/// RFC 3339 from the API shown as "2024-05-01 13:37 UTC"; anything else as-is.
pub fn fmt_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&chrono::Utc).format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hx_trigger_is_json() {
        let v = hx_trigger_value(&["ordersUpdated", "balanceUpdated"]);
        assert_eq!(v.to_str().unwrap(), r#"{"ordersUpdated":true,"balanceUpdated":true}"#);
    }

    #[test]
    fn timestamps_fall_back_to_raw() {
        assert_eq!(fmt_timestamp("2024-05-01T13:37:00+02:00"), "2024-05-01 11:37 UTC");
        assert_eq!(fmt_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn amounts_must_be_finite_numbers() {
        assert_eq!(parse_amount(" 100.5 "), Some(100.5));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("-3"), Some(-3.0));
    }

    #[test]
    fn order_json_carries_status_view() {
        let o: Order = serde_json::from_str(r#"{"id":9,"status":"AWAITING_CONFIRMATION","amount":"100"}"#).unwrap();
        let v = order_json(&o);
        assert_eq!(v["tone"], "warning");
        assert_eq!(v["panel"], "awaiting_confirmation");
        assert_eq!(v["can_submit_proof"], false);
        assert_eq!(v["amount"], "100.00");
    }
}
