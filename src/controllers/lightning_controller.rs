use axum::{
    extract::{Extension, Form, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::{CurrentSession, LightningTransaction},
    render,
    services::{invoice::normalize_invoice, order_status, qr_scan::ScanOutcome},
    AppState,
};

use super::support::{api_failure, fmt_timestamp, hx_trigger_value, page, Retry};

fn tx_rows(txs: &[LightningTransaction]) -> serde_json::Value {
    let items: Vec<_> = txs
        .iter()
        .map(|t| {
            let view = order_status::view_for(&t.status);
            json!({
                "id": t.id,
                "incoming": t.direction.eq_ignore_ascii_case("incoming"),
                "direction": t.direction,
                "amount": t.amount,
                "status_label": t.status.label(),
                "tone": view.tone.css(),
                "icon": view.icon.glyph(),
                "memo": t.memo,
                "created_at": t.created_at.as_deref().map(fmt_timestamp),
            })
        })
        .collect();

    json!({ "transactions": items, "is_empty": items.is_empty() })
}

// GET /lightning
pub async fn get_lightning(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    let txs = match state.api.lightning_transactions(&session.token).await {
        Ok(t) => t,
        Err(e) => return api_failure(&state, &headers, &session, e, Retry::get("/lightning")).await,
    };

    let history = render::render_partial(&state, "partials/ln_transactions", &tx_rows(&txs));
    let body = render::render_partial(
        &state,
        "pages/lightning",
        &json!({ "history": history, "invoice_values": {}, "pay_values": {} }),
    );

    page(&state, &headers, Some(&session), "Lightning", StatusCode::OK, body)
}

// GET /lightning/transactions (HTMX partial, refreshed on lightningUpdated)
pub async fn get_ln_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    let txs = match state.api.lightning_transactions(&session.token).await {
        Ok(t) => t,
        Err(e) => return api_failure(&state, &headers, &session, e, Retry::get("/lightning/transactions")).await,
    };

    let html = render::render_partial(&state, "partials/ln_transactions", &tx_rows(&txs));
    (StatusCode::OK, Html(html)).into_response()
}

#[derive(Deserialize, Default)]
pub struct InvoiceForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub memo: String,
}

// POST /lightning/invoice
pub async fn post_invoice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
    Form(form): Form<InvoiceForm>,
) -> Response {
    let amount = form.amount.trim().parse::<i64>().ok().filter(|v| *v > 0);
    let Some(amount) = amount else {
        let html = render::render_partial(
            &state,
            "partials/invoice",
            &json!({
                "values": { "amount": form.amount.trim(), "memo": form.memo.trim() },
                "errors": { "amount": "Enter a whole number of sats greater than zero." },
            }),
        );
        return (StatusCode::OK, Html(html)).into_response();
    };

    let memo = Some(form.memo.trim()).filter(|m| !m.is_empty());
    let invoice = match state.api.generate_invoice(&session.token, amount, memo).await {
        Ok(i) => i,
        Err(e) => {
            return api_failure(&state, &headers, &session, e, Retry::post("/lightning/invoice", "#invoice-form")).await;
        }
    };

    tracing::info!(amount_sats = amount, "lightning invoice generated");
    state.notify("lightningUpdated");

    let html = render::render_partial(
        &state,
        "partials/invoice",
        &json!({
            "invoice": {
                "payment_request": invoice.payment_request,
                "amount": invoice.amount,
                "memo": invoice.memo,
                "expires_at": invoice.expires_at.as_deref().map(fmt_timestamp),
            },
            "values": {},
            "errors": {},
        }),
    );

    let mut out = HeaderMap::new();
    out.insert("HX-Trigger", hx_trigger_value(&["lightningUpdated"]));
    (StatusCode::OK, out, Html(html)).into_response()
}

#[derive(Deserialize, Default)]
pub struct PayForm {
    #[serde(default)]
    pub payment_request: String,
}

// POST /lightning/pay
pub async fn post_pay(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
    Form(form): Form<PayForm>,
) -> Response {
    let Some(invoice) = normalize_invoice(&form.payment_request) else {
        let html = render::render_partial(
            &state,
            "partials/payment_result",
            &json!({
                "values": { "payment_request": form.payment_request.trim() },
                "errors": { "payment_request": "That does not look like a Lightning invoice." },
            }),
        );
        return (StatusCode::OK, Html(html)).into_response();
    };

    let result = match state.api.pay_invoice(&session.token, &invoice).await {
        Ok(r) => r,
        Err(e) => {
            return api_failure(&state, &headers, &session, e, Retry::post("/lightning/pay", "#pay-form")).await;
        }
    };

    tracing::info!(status = %result.status, amount_sats = result.amount, "lightning payment sent");
    state.notify("balanceUpdated");
    state.notify("lightningUpdated");

    let view = order_status::view_for(&result.status);
    let html = render::render_partial(
        &state,
        "partials/payment_result",
        &json!({
            "result": {
                "status_label": result.status.label(),
                "tone": view.tone.css(),
                "icon": view.icon.glyph(),
                "amount": result.amount,
                "fee": result.fee,
                "payment_hash": result.payment_hash,
            },
            "values": {},
            "errors": {},
        }),
    );

    let mut out = HeaderMap::new();
    out.insert("HX-Trigger", hx_trigger_value(&["balanceUpdated", "lightningUpdated"]));
    (StatusCode::OK, out, Html(html)).into_response()
}

#[derive(Deserialize, Default)]
pub struct ScanReport {
    #[serde(default)]
    pub outcome: String,
    #[serde(default)]
    pub payload: String,
    #[serde(default)]
    pub detail: String,
}

// POST /lightning/scan (HTMX, sent by the scan dialog when it ends)
pub async fn post_scan(
    State(state): State<AppState>,
    Form(report): Form<ScanReport>,
) -> Response {
    let outcome = ScanOutcome::from_report(&report.outcome, &report.payload, &report.detail);

    let ctx = match &outcome {
        ScanOutcome::Decoded(_) => match outcome.invoice() {
            Some(invoice) => json!({ "invoice": invoice }),
            None => json!({ "not_invoice": true }),
        },
        ScanOutcome::Unavailable(msg) => {
            tracing::info!(reason = %msg, "qr scanner unavailable in browser");
            json!({ "unavailable": msg })
        }
        ScanOutcome::Closed => json!({}),
    };

    let html = render::render_partial(&state, "partials/scan_result", &ctx);
    (StatusCode::OK, Html(html)).into_response()
}
