use axum::{
    extract::{Extension, Form, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::ApiError,
    models::{BalanceState, CurrentSession, Direction, QuoteInput},
    render,
    services::{
        auth_service::FieldErrors,
        quote_service::{DraftKey, QuoteOutcome},
        sell_wizard::{SellStep, SellWizard, WizardEvent},
    },
    AppState,
};

use super::support::{api_failure, fmt2, fmt_btc, page, parse_amount, quote_response, Retry};

#[derive(Deserialize, Default)]
pub struct AmountForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
}

#[derive(Deserialize, Default)]
pub struct ProviderForm {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub payout_details: String,
}

fn balance_bound(b: &BalanceState) -> Option<f64> {
    b.available()
}

fn sell_quote_input(wizard: &SellWizard, provider: Option<&str>) -> Option<QuoteInput> {
    let draft = wizard.draft();
    let amount = draft.amount?;
    Some(QuoteInput {
        direction: Direction::Sell,
        amount,
        currency: draft.currency.clone(),
        provider: provider
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
    })
}

fn step_ctx(wizard: &SellWizard) -> serde_json::Value {
    let step = wizard.step();
    json!({
        "index": step.index(),
        "is_amount": step == SellStep::AmountEntry,
        "is_provider": step == SellStep::ProviderSelection,
        "is_confirm": step == SellStep::Confirmation,
    })
}

/// Renders whatever step the wizard is on.
async fn render_step(
    state: &AppState,
    headers: &HeaderMap,
    session: &CurrentSession,
    wizard: &SellWizard,
    errors: FieldErrors,
    values: serde_json::Value,
) -> Result<String, Response> {
    let draft = wizard.draft();

    match wizard.step() {
        SellStep::AmountEntry => {
            let currency = if draft.currency.is_empty() {
                state.settings.display_currency.clone()
            } else {
                draft.currency.clone()
            };
            let prefill = json!({
                "amount": draft.amount.map(fmt_btc).unwrap_or_default(),
                "currency": currency,
            });

            Ok(render::render_partial(
                state,
                "partials/sell_amount",
                &json!({
                    "step": step_ctx(wizard),
                    "available": wizard.available_balance().map(fmt_btc),
                    "values": if values.is_null() { prefill } else { values },
                    "errors": errors,
                }),
            ))
        }
        SellStep::ProviderSelection => {
            let providers = match state.api.sell_providers(&session.token).await {
                Ok(p) => p,
                Err(e) => return Err(api_failure(state, headers, session, e, Retry::get("/sell/step")).await),
            };

            let selected = draft.provider_id.clone().unwrap_or_default();
            let items: Vec<_> = providers
                .iter()
                .filter(|p| p.supports(&draft.currency))
                .map(|p| {
                    json!({
                        "id": p.id,
                        "name": p.name,
                        "fee_percent": p.fee_percent,
                        "payout_hint": p.payout_hint,
                        "selected": p.id == selected,
                    })
                })
                .collect();

            let shown_quote = sell_quote_input(wizard, draft.provider_id.as_deref())
                .and_then(|input| {
                    state
                        .quotes
                        .displayed_for(&DraftKey::new(&session.token, Direction::Sell), &input)
                });

            let prefill = json!({
                "provider": selected,
                "payout_details": draft.payout_details.clone().unwrap_or_default(),
            });

            Ok(render::render_partial(
                state,
                "partials/sell_provider",
                &json!({
                    "step": step_ctx(wizard),
                    "amount": draft.amount.map(fmt_btc),
                    "currency": draft.currency,
                    "providers": items,
                    "has_providers": !items.is_empty(),
                    "quote": shown_quote.map(|q| json!({
                        "fee": fmt2(q.fee),
                        "total_amount": fmt2(q.total_amount),
                        "currency": q.currency,
                    })),
                    "values": if values.is_null() { prefill } else { values },
                    "errors": errors,
                }),
            ))
        }
        SellStep::Confirmation => {
            let provider_id = draft.provider_id.clone().unwrap_or_default();

            // both lookups are informational; the summary renders without them
            let provider_name = match state.api.sell_providers(&session.token).await {
                Ok(list) => list
                    .into_iter()
                    .find(|p| p.id == provider_id)
                    .map(|p| p.name)
                    .unwrap_or_else(|| provider_id.clone()),
                Err(ApiError::Unauthorized) => {
                    return Err(api_failure(state, headers, session, ApiError::Unauthorized, Retry::get("/sell/step")).await);
                }
                Err(_) => provider_id.clone(),
            };

            let mut quote = None;
            if let Some(input) = sell_quote_input(wizard, Some(&provider_id)) {
                let key = DraftKey::new(&session.token, Direction::Sell);
                match state.quotes.request(key.clone(), &session.token, input).await {
                    Ok(QuoteOutcome::Fresh(q)) => quote = Some(q),
                    Ok(QuoteOutcome::Superseded) => quote = state.quotes.displayed(&key),
                    Err(ApiError::Unauthorized) => {
                        return Err(api_failure(state, headers, session, ApiError::Unauthorized, Retry::get("/sell/step")).await);
                    }
                    Err(e) => tracing::warn!(error = %e, "sell quote unavailable on confirmation"),
                }
            }

            Ok(render::render_partial(
                state,
                "partials/sell_confirm",
                &json!({
                    "step": step_ctx(wizard),
                    "amount": draft.amount.map(fmt_btc),
                    "currency": draft.currency,
                    "provider": provider_name,
                    "payout_details": draft.payout_details,
                    "quote": quote.map(|q| json!({
                        "fee": fmt2(q.fee),
                        "total_amount": fmt2(q.total_amount),
                        "currency": q.currency,
                    })),
                }),
            ))
        }
    }
}

async fn step_response(
    state: &AppState,
    headers: &HeaderMap,
    session: &CurrentSession,
    wizard: &SellWizard,
    errors: FieldErrors,
    values: serde_json::Value,
) -> Response {
    match render_step(state, headers, session, wizard, errors, values).await {
        Ok(html) => (StatusCode::OK, Html(html)).into_response(),
        Err(res) => res,
    }
}

// GET /sell: a full load always starts over
pub async fn get_sell(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    state.wizards.start(&session.token).await;

    let balance = match state.api.balance(&session.token).await {
        Ok(b) => b,
        Err(e) => return api_failure(&state, &headers, &session, e, Retry::get("/sell")).await,
    };

    let wizard = state
        .wizards
        .update(&session.token, |w| {
            w.update_balance(balance_bound(&balance));
            w.clone()
        })
        .await;

    let step_html = match render_step(&state, &headers, &session, &wizard, FieldErrors::new(), serde_json::Value::Null).await {
        Ok(html) => html,
        Err(res) => return res,
    };

    let body = render::render_partial(
        &state,
        "pages/sell",
        &json!({
            "step_html": step_html,
            "provisioning": matches!(balance, BalanceState::Provisioning),
        }),
    );

    page(&state, &headers, Some(&session), "Sell bitcoin", StatusCode::OK, body)
}

// GET /sell/step (HTMX): re-render the current step, used by retry buttons
pub async fn get_sell_step(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    let wizard = state.wizards.update(&session.token, |w| w.clone()).await;
    step_response(&state, &headers, &session, &wizard, FieldErrors::new(), serde_json::Value::Null).await
}

// POST /sell/amount
pub async fn post_sell_amount(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
    Form(form): Form<AmountForm>,
) -> Response {
    // validate against the balance as it is now, not as it was at page load
    let balance = match state.api.balance(&session.token).await {
        Ok(b) => b,
        Err(e) => {
            return api_failure(&state, &headers, &session, e, Retry::post("/sell/amount", "#sell-amount-form")).await;
        }
    };

    let amount = parse_amount(&form.amount).unwrap_or(f64::NAN);
    let event = WizardEvent::SubmitAmount {
        amount,
        currency: form.currency.clone(),
    };

    let (wizard, result) = state
        .wizards
        .update(&session.token, |w| {
            w.update_balance(balance_bound(&balance));
            let res = w.apply(event);
            (w.clone(), res)
        })
        .await;

    match result {
        Ok(_) => step_response(&state, &headers, &session, &wizard, FieldErrors::new(), serde_json::Value::Null).await,
        Err(e) => {
            tracing::debug!(error = %e, "sell amount rejected");
            let values = json!({ "amount": form.amount.trim(), "currency": form.currency.trim().to_uppercase() });
            step_response(&state, &headers, &session, &wizard, e.into_field_errors(), values).await
        }
    }
}

// POST /sell/provider
pub async fn post_sell_provider(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
    Form(form): Form<ProviderForm>,
) -> Response {
    let balance = match state.api.balance(&session.token).await {
        Ok(b) => b,
        Err(e) => {
            return api_failure(&state, &headers, &session, e, Retry::post("/sell/provider", "#sell-provider-form")).await;
        }
    };

    let event = WizardEvent::SubmitProvider {
        provider_id: form.provider.clone(),
        payout_details: form.payout_details.clone(),
    };

    let (wizard, result) = state
        .wizards
        .update(&session.token, |w| {
            w.update_balance(balance_bound(&balance));
            let res = w.apply(event);
            (w.clone(), res)
        })
        .await;

    match result {
        Ok(_) => step_response(&state, &headers, &session, &wizard, FieldErrors::new(), serde_json::Value::Null).await,
        Err(e) => {
            tracing::debug!(error = %e, "sell provider step rejected");
            let values = match wizard.step() {
                SellStep::ProviderSelection => json!({
                    "provider": form.provider.trim(),
                    "payout_details": form.payout_details.trim(),
                }),
                _ => serde_json::Value::Null,
            };
            step_response(&state, &headers, &session, &wizard, e.into_field_errors(), values).await
        }
    }
}

// POST /sell/back
pub async fn post_sell_back(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    let (wizard, result) = state
        .wizards
        .update(&session.token, |w| {
            let res = w.apply(WizardEvent::Back);
            (w.clone(), res)
        })
        .await;

    let errors = result.err().map(|e| e.into_field_errors()).unwrap_or_default();
    step_response(&state, &headers, &session, &wizard, errors, serde_json::Value::Null).await
}

/// Fields present in the form override the wizard draft: the amount step
/// sends amount and currency, the provider step only the provider.
#[derive(Deserialize, Default)]
pub struct SellQuoteForm {
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

fn form_quote_input(form: &SellQuoteForm, wizard: Option<&SellWizard>) -> Option<QuoteInput> {
    let draft = wizard.map(|w| w.draft());

    let amount = match &form.amount {
        Some(raw) => parse_amount(raw).unwrap_or(0.0),
        None => draft.and_then(|d| d.amount)?,
    };
    let currency = match &form.currency {
        Some(raw) => raw.trim().to_uppercase(),
        None => draft.map(|d| d.currency.clone())?,
    };
    if currency.is_empty() {
        return None;
    }
    let provider = form
        .provider
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    Some(QuoteInput {
        direction: Direction::Sell,
        amount,
        currency,
        provider,
    })
}

// POST /sell/quote (HTMX, on amount/currency input and provider change)
pub async fn post_sell_quote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Extension(session): Extension<CurrentSession>,
    Form(form): Form<SellQuoteForm>,
) -> Response {
    let wizard = state.wizards.get(&session.token).await;
    let input = form_quote_input(&form, wizard.as_ref());
    let include = if form.amount.is_some() {
        "#sell-amount-form"
    } else {
        "#sell-provider-form"
    };

    quote_response(
        &state,
        &headers,
        &session,
        Direction::Sell,
        input,
        Retry::post("/sell/quote", include),
    )
    .await
}
