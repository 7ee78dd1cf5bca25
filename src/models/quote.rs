use serde::{Deserialize, Serialize};

use super::{flex, Direction};

/// What the user currently has typed into an amount form. Two inputs that
/// compare equal describe the same quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteInput {
    #[serde(rename = "order_type")]
    pub direction: Direction,
    pub amount: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Response of `POST /orders/calculate-fee/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeQuote {
    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    pub amount: f64,

    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    pub fee: f64,

    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    pub total_amount: f64,

    #[serde(default)]
    pub currency: String,
}
