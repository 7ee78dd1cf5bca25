use axum::{
    extract::{Extension, Form, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::{CurrentSession, Direction, NewOrder, Provider, QuoteInput},
    render,
    services::auth_service::FieldErrors,
    AppState,
};

use super::support::{api_failure, hx_trigger_value, page, parse_amount, quote_response, redirect_to, Retry};

#[derive(Deserialize, Default)]
pub struct BuyForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub provider: String,
}

fn providers_json(providers: &[Provider], selected: &str) -> Vec<serde_json::Value> {
    providers
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "name": p.name,
                "fee_percent": p.fee_percent,
                "currencies": p.currencies.join(", "),
                "selected": p.id == selected,
            })
        })
        .collect()
}

fn render_buy(state: &AppState, providers: &[Provider], form: &BuyForm, errors: &FieldErrors) -> String {
    let currency = if form.currency.trim().is_empty() {
        state.settings.display_currency.clone()
    } else {
        form.currency.trim().to_uppercase()
    };

    render::render_partial(
        state,
        "pages/buy",
        &json!({
            "providers": providers_json(providers, form.provider.trim()),
            "has_providers": !providers.is_empty(),
            "values": { "amount": form.amount.trim(), "currency": currency },
            "errors": errors,
        }),
    )
}

// GET /buy
pub async fn get_buy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    let providers = match state.api.buy_providers(&session.token).await {
        Ok(p) => p,
        Err(e) => return api_failure(&state, &headers, &session, e, Retry::get("/buy")).await,
    };

    let body = render_buy(&state, &providers, &BuyForm::default(), &FieldErrors::new());
    page(&state, &headers, Some(&session), "Buy bitcoin", StatusCode::OK, body)
}

fn quote_input(form: &BuyForm) -> Option<QuoteInput> {
    let currency = form.currency.trim().to_uppercase();
    if currency.is_empty() {
        return None;
    }
    let provider = Some(form.provider.trim().to_string()).filter(|p| !p.is_empty());

    Some(QuoteInput {
        direction: Direction::Buy,
        // unparsable input is quoted as "nothing yet"
        amount: parse_amount(&form.amount).unwrap_or(0.0),
        currency,
        provider,
    })
}

// POST /buy/quote (HTMX, fired on every amount/currency/provider change)
pub async fn post_buy_quote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
    Form(form): Form<BuyForm>,
) -> Response {
    quote_response(
        &state,
        &headers,
        &session,
        Direction::Buy,
        quote_input(&form),
        Retry::post("/buy/quote", "#buy-form"),
    )
    .await
}

fn validate(form: &BuyForm) -> Result<NewOrder, FieldErrors> {
    let mut errs = FieldErrors::new();

    let amount = match parse_amount(&form.amount) {
        Some(a) if a > 0.0 => a,
        _ => {
            errs.insert("amount".into(), "Enter an amount greater than zero.".into());
            0.0
        }
    };

    let currency = form.currency.trim().to_uppercase();
    if currency.is_empty() {
        errs.insert("currency".into(), "Choose a currency.".into());
    }

    let provider = form.provider.trim().to_string();
    if provider.is_empty() {
        errs.insert("provider".into(), "Choose a provider.".into());
    }

    if !errs.is_empty() {
        return Err(errs);
    }

    Ok(NewOrder {
        direction: Direction::Buy,
        amount,
        currency,
        provider,
        payout_details: None,
    })
}

// POST /buy
pub async fn post_buy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
    Form(form): Form<BuyForm>,
) -> Response {
    let new_order = match validate(&form) {
        Ok(o) => o,
        Err(errs) => {
            let providers = match state.api.buy_providers(&session.token).await {
                Ok(p) => p,
                Err(e) => return api_failure(&state, &headers, &session, e, Retry::get("/buy")).await,
            };
            let body = render_buy(&state, &providers, &form, &errs);
            return page(&state, &headers, Some(&session), "Buy bitcoin", StatusCode::OK, body);
        }
    };

    let order = match state.api.create_order(&session.token, &new_order).await {
        Ok(o) => o,
        Err(e) => return api_failure(&state, &headers, &session, e, Retry::post("/buy", "#buy-form")).await,
    };

    tracing::info!(order_id = %order.id, amount = new_order.amount, currency = %new_order.currency, "buy order created");
    state.notify("ordersUpdated");

    let mut res = redirect_to(&headers, &format!("/orders/{}", order.id));
    res.headers_mut().insert("HX-Trigger", hx_trigger_value(&["ordersUpdated"]));
    res
}
