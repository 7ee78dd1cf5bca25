use serde::{Deserialize, Serialize};

use super::{flex, OrderStatus};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default)]
    pub payment_request: String,

    // sats
    #[serde(default, deserialize_with = "flex::i64_or_zero")]
    pub amount: i64,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub memo: Option<String>,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub payment_hash: Option<String>,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentResult {
    #[serde(default)]
    pub status: OrderStatus,

    // sats
    #[serde(default, deserialize_with = "flex::i64_or_zero")]
    pub amount: i64,

    #[serde(default, deserialize_with = "flex::i64_or_zero")]
    pub fee: i64,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub payment_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LightningTransaction {
    #[serde(default, deserialize_with = "flex::string_or_number")]
    pub id: String,

    // "incoming" | "outgoing"
    #[serde(default)]
    pub direction: String,

    // sats
    #[serde(default, deserialize_with = "flex::i64_or_zero")]
    pub amount: i64,

    #[serde(default)]
    pub status: OrderStatus,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub memo: Option<String>,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub created_at: Option<String>,
}
