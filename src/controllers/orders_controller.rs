use axum::{
    extract::{Extension, Form, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::{CurrentSession, Order},
    render,
    AppState,
};

use super::support::{api_failure, hx_trigger_value, order_json, page, Retry};

fn rows_ctx(orders: &[Order]) -> serde_json::Value {
    let items: Vec<_> = orders.iter().map(order_json).collect();
    json!({ "orders": items, "is_empty": items.is_empty() })
}

// GET /orders
pub async fn get_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    let orders = match state.api.list_orders(&session.token).await {
        Ok(o) => o,
        Err(e) => return api_failure(&state, &headers, &session, e, Retry::get("/orders")).await,
    };

    let rows = render::render_partial(&state, "partials/order_rows", &rows_ctx(&orders));
    let body = render::render_partial(&state, "pages/orders", &json!({ "rows": rows }));

    page(&state, &headers, Some(&session), "Orders", StatusCode::OK, body)
}

// GET /orders/rows (HTMX partial, refreshed on ordersUpdated)
pub async fn get_order_rows(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    let orders = match state.api.list_orders(&session.token).await {
        Ok(o) => o,
        Err(e) => return api_failure(&state, &headers, &session, e, Retry::get("/orders/rows")).await,
    };

    let html = render::render_partial(&state, "partials/order_rows", &rows_ctx(&orders));
    (StatusCode::OK, Html(html)).into_response()
}

fn panel_html(state: &AppState, order: &Order, errors: serde_json::Value) -> String {
    render::render_partial(
        state,
        "partials/order_panel",
        &json!({ "order": order_json(order), "errors": errors }),
    )
}

// GET /orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    let retry_url = format!("/orders/{id}");
    let order = match state.api.get_order(&session.token, &id).await {
        Ok(o) => o,
        Err(e) => return api_failure(&state, &headers, &session, e, Retry::get(&retry_url)).await,
    };

    let panel = panel_html(&state, &order, json!({}));
    let body = render::render_partial(
        &state,
        "pages/order_detail",
        &json!({ "order": order_json(&order), "panel": panel }),
    );

    page(&state, &headers, Some(&session), "Order", StatusCode::OK, body)
}

// GET /orders/:id/panel (HTMX partial)
pub async fn get_order_panel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    let retry_url = format!("/orders/{id}/panel");
    let order = match state.api.get_order(&session.token, &id).await {
        Ok(o) => o,
        Err(e) => return api_failure(&state, &headers, &session, e, Retry::get(&retry_url)).await,
    };

    (StatusCode::OK, Html(panel_html(&state, &order, json!({})))).into_response()
}

#[derive(Deserialize)]
pub struct PaymentProofForm {
    #[serde(default)]
    pub payment_proof: String,
}

// POST /orders/:id/payment-proof
pub async fn post_payment_proof(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Extension(session): Extension<CurrentSession>,
    Form(form): Form<PaymentProofForm>,
) -> Response {
    let proof = form.payment_proof.trim().to_string();
    let retry_url = format!("/orders/{id}/panel");

    if proof.is_empty() {
        // re-render against the current server state, not a guess
        let order = match state.api.get_order(&session.token, &id).await {
            Ok(o) => o,
            Err(e) => return api_failure(&state, &headers, &session, e, Retry::get(&retry_url)).await,
        };
        let html = panel_html(
            &state,
            &order,
            json!({ "payment_proof": "Enter the payment reference or receipt." }),
        );
        return (StatusCode::OK, Html(html)).into_response();
    }

    let order = match state.api.submit_payment_proof(&session.token, &id, &proof).await {
        Ok(o) => o,
        Err(e) => return api_failure(&state, &headers, &session, e, Retry::get(&retry_url)).await,
    };

    tracing::info!(order_id = %order.id, status = %order.status, "payment proof submitted");
    state.notify("ordersUpdated");

    let mut out = HeaderMap::new();
    out.insert("HX-Trigger", hx_trigger_value(&["ordersUpdated"]));
    (StatusCode::OK, out, Html(panel_html(&state, &order, json!({})))).into_response()
}
