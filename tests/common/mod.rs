//! Shared harness: a fake wallet API on a random local port and an app state
//! pointed at it.
#![allow(dead_code)]

use axum::{
    extract::Path,
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use rustwallet::{config::Settings, routes, templates, AppState};

pub const COOKIE: &str = "wallet_token";
pub const INVOICE: &str = "lnbc2500u1pvjluezpp5qqqsyqcyq5rqwzqfqqqsyqcyq5rqwzqfqqqsyqcyq5rqwzqfqypq";

/// Tokens the fake API understands:
/// - `good`: funded wallet with 0.5 BTC available
/// - `fresh`: wallet still provisioning (balance answers 403)
/// - anything else: 401
fn who(headers: &HeaderMap) -> &'static str {
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some("Token good") => "good",
        Some("Token fresh") => "fresh",
        _ => "anon",
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid token."}))).into_response()
}

macro_rules! authed {
    ($headers:expr) => {
        if who(&$headers) == "anon" {
            return unauthorized();
        }
    };
}

fn order(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "order_type": "buy",
        "status": status,
        "amount": "100.00",
        "fee": "2.00",
        "total_amount": "102.00",
        "currency": "USD",
        "provider": "Acme Pay",
        "created_at": "2024-05-01T13:37:00Z"
    })
}

fn providers() -> Value {
    json!([
        {"id": "p1", "name": "Acme Pay", "fee_percent": "2.0", "currencies": ["USD", "EUR"]},
        {"id": 2, "name": "Shilling Express", "fee_percent": 1.5, "currencies": ["KES"]}
    ])
}

pub fn fake_wallet_api() -> Router {
    Router::new()
        .route(
            "/auth/login/",
            post(|Json(body): Json<Value>| async move {
                if body["password"] == "secret" || body["password"] == "  spaced out  " {
                    (StatusCode::OK, Json(json!({"token": "good"}))).into_response()
                } else {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"non_field_errors": ["Unable to log in."]})),
                    )
                        .into_response()
                }
            }),
        )
        .route(
            "/auth/user/",
            get(|headers: HeaderMap| async move {
                authed!(headers);
                Json(json!({"id": 1, "username": "satoshi", "email": "s@example.com"})).into_response()
            }),
        )
        .route(
            "/wallet/balance/",
            get(|headers: HeaderMap| async move {
                match who(&headers) {
                    "good" => Json(json!({"available": "0.5", "pending": 0})).into_response(),
                    "fresh" => StatusCode::FORBIDDEN.into_response(),
                    _ => unauthorized(),
                }
            }),
        )
        .route(
            "/wallet/wallets/",
            get(|headers: HeaderMap| async move {
                authed!(headers);
                Json(json!({"results": [{"id": 1, "label": "Main", "kind": "onchain", "balance": "0.5"}]}))
                    .into_response()
            }),
        )
        .route(
            "/providers/buy/",
            get(|headers: HeaderMap| async move {
                authed!(headers);
                Json(providers()).into_response()
            }),
        )
        .route(
            "/providers/sell/",
            get(|headers: HeaderMap| async move {
                authed!(headers);
                Json(json!({"results": providers()})).into_response()
            }),
        )
        .route(
            "/orders/calculate-fee/",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                authed!(headers);
                let amount = body["amount"].as_f64().unwrap_or(0.0);
                let fee = amount * 0.02;
                Json(json!({
                    "amount": amount,
                    "fee": fee,
                    "total_amount": amount + fee,
                    "currency": body["currency"],
                }))
                .into_response()
            }),
        )
        .route(
            "/orders/",
            get(|headers: HeaderMap| async move {
                authed!(headers);
                Json(json!([order("7", "AWAITING_CONFIRMATION"), order("8", "pending")])).into_response()
            })
            .post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                authed!(headers);
                let mut o = order("42", "pending");
                o["amount"] = body["amount"].clone();
                (StatusCode::CREATED, Json(o)).into_response()
            }),
        )
        .route(
            "/orders/:id/",
            get(|headers: HeaderMap, Path(id): Path<String>| async move {
                authed!(headers);
                match id.as_str() {
                    "7" => Json(order("7", "AWAITING_CONFIRMATION")).into_response(),
                    "8" => Json(order("8", "pending")).into_response(),
                    "9" => Json(order("9", "completed")).into_response(),
                    _ => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
                }
            })
            .patch(|headers: HeaderMap, Path(id): Path<String>, Json(body): Json<Value>| async move {
                authed!(headers);
                let mut o = order(&id, "awaiting_confirmation");
                o["payment_proof"] = body["payment_proof"].clone();
                Json(o).into_response()
            }),
        )
        .route(
            "/lightning/invoices/",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                authed!(headers);
                Json(json!({
                    "payment_request": INVOICE,
                    "amount": body["amount"],
                    "memo": body["memo"],
                }))
                .into_response()
            }),
        )
        .route(
            "/lightning/payments/",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                authed!(headers);
                if body["payment_request"] != INVOICE {
                    return (StatusCode::BAD_REQUEST, Json(json!({"detail": "Unknown invoice."}))).into_response();
                }
                Json(json!({"status": "SUCCEEDED", "amount": 250000, "fee": 3, "payment_hash": "abc123"}))
                    .into_response()
            }),
        )
        .route(
            "/lightning/transactions/",
            get(|headers: HeaderMap| async move {
                authed!(headers);
                Json(json!([
                    {"id": 1, "direction": "incoming", "amount": 1000, "status": "paid", "memo": "coffee"}
                ]))
                .into_response()
            }),
        )
        .route(
            "/simple/price",
            get(|| async { Json(json!({"bitcoin": {"usd": 60000.0}})) }),
        )
}

pub fn settings(api_url: String, quote_debounce_ms: u64) -> Settings {
    Settings {
        host: "127.0.0.1".to_string(),
        port: 0,
        wallet_api_url: api_url.clone(),
        price_feed_url: api_url,
        display_currency: "USD".to_string(),
        session_cookie_name: COOKIE.to_string(),
        cookie_secure: false,
        quote_debounce_ms,
    }
}

/// App state backed by a freshly spawned fake API.
pub async fn test_state() -> AppState {
    test_state_with_debounce(0).await
}

/// Same, with a real quote debounce window.
pub async fn test_state_with_debounce(quote_debounce_ms: u64) -> AppState {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, fake_wallet_api()).await.unwrap();
    });

    let hbs = templates::build_handlebars().unwrap();
    AppState::new(settings(format!("http://{addr}"), quote_debounce_ms), hbs)
}

/// App state whose wallet API cannot be reached.
pub fn unreachable_state() -> AppState {
    let hbs = templates::build_handlebars().unwrap();
    AppState::new(settings("http://127.0.0.1:1".to_string(), 0), hbs)
}

pub async fn send(state: &AppState, req: Request<axum::body::Body>) -> Response {
    routes::app(state.clone()).oneshot(req).await.unwrap()
}

pub fn get_as(uri: &str, token: Option<&str>) -> Request<axum::body::Body> {
    let mut b = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        b = b.header(header::COOKIE, format!("{COOKIE}={t}"));
    }
    b.body(axum::body::Body::empty()).unwrap()
}

pub fn htmx_get_as(uri: &str, token: Option<&str>) -> Request<axum::body::Body> {
    let mut req = get_as(uri, token);
    req.headers_mut().insert("HX-Request", "true".parse().unwrap());
    req
}

pub fn post_form_as(uri: &str, token: Option<&str>, body: &str) -> Request<axum::body::Body> {
    let mut b = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("HX-Request", "true");
    if let Some(t) = token {
        b = b.header(header::COOKIE, format!("{COOKIE}={t}"));
    }
    b.body(axum::body::Body::from(body.to_string())).unwrap()
}

pub async fn body_string(res: Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

pub fn header_str<'a>(res: &'a Response, name: &str) -> Option<&'a str> {
    res.headers().get(name).and_then(|v| v.to_str().ok())
}
