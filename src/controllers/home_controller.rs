use axum::{
    extract::{Extension, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use crate::{
    models::{BalanceState, CurrentSession},
    render,
    AppState,
};

use super::support::{api_failure, fmt2, fmt_btc, page, Retry};

pub async fn home(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Option<Extension<CurrentSession>>,
) -> Response {
    let session_ref = session.as_ref().map(|Extension(s)| s);

    let (title, body) = match session_ref {
        Some(_) => (
            "Dashboard",
            render::render_partial(
                &state,
                "pages/dashboard",
                &json!({ "display_currency": state.settings.display_currency }),
            ),
        ),
        None => ("RustWallet", render::render_partial(&state, "pages/home", &json!({}))),
    };

    page(&state, &headers, session_ref, title, StatusCode::OK, body)
}

// GET /balance (HTMX partial, refreshed on balanceUpdated)
pub async fn get_balance_panel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    let balance = match state.api.balance(&session.token).await {
        Ok(b) => b,
        Err(e) => return api_failure(&state, &headers, &session, e, Retry::get("/balance")).await,
    };

    let ctx = match balance {
        BalanceState::Provisioning => json!({ "provisioning": true }),
        BalanceState::Ready(b) => {
            let currency = state.settings.display_currency.clone();
            // the price feed is decoration; a failure only hides the fiat line
            let fiat = match state.prices.btc_price(&currency).await {
                Ok(price) => Some(fmt2(b.available * price)),
                Err(e) => {
                    tracing::debug!(error = %e, "price feed unavailable");
                    None
                }
            };

            json!({
                "provisioning": false,
                "available": fmt_btc(b.available),
                "pending": fmt_btc(b.pending),
                "has_pending": b.pending > 0.0,
                "unit": b.currency,
                "fiat": fiat,
                "fiat_currency": currency,
            })
        }
    };

    let html = render::render_partial(&state, "partials/balance_panel", &ctx);
    (StatusCode::OK, Html(html)).into_response()
}

// GET /wallets (HTMX partial)
pub async fn get_wallets(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    let wallets = match state.api.wallets(&session.token).await {
        Ok(w) => w,
        Err(e) => return api_failure(&state, &headers, &session, e, Retry::get("/wallets")).await,
    };

    let items: Vec<_> = wallets
        .iter()
        .map(|w| {
            json!({
                "label": if w.label.is_empty() { format!("Wallet {}", w.id) } else { w.label.clone() },
                "kind": w.kind,
                "balance": fmt_btc(w.balance),
                "address": w.address,
            })
        })
        .collect();

    let html = render::render_partial(&state, "partials/wallets", &json!({ "wallets": items }));
    (StatusCode::OK, Html(html)).into_response()
}

pub async fn not_found(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Option<Extension<CurrentSession>>,
) -> Response {
    let body = render::render_partial(&state, "pages/not_found", &json!({}));
    let session_ref = session.as_ref().map(|Extension(s)| s);
    page(&state, &headers, session_ref, "404", StatusCode::NOT_FOUND, body)
}

pub async fn health() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));
    (StatusCode::OK, headers, Html("ok".to_string()))
}
