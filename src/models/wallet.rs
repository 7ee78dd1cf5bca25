use serde::{Deserialize, Serialize};

use super::flex;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    pub available: f64,

    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    pub pending: f64,

    #[serde(default = "default_unit")]
    pub currency: String,
}

fn default_unit() -> String {
    "BTC".to_string()
}

/// A 403 on the balance endpoint means the wallet is still being created on
/// the server side, which is a normal state for fresh accounts.
#[derive(Debug, Clone)]
pub enum BalanceState {
    Ready(Balance),
    Provisioning,
}

impl BalanceState {
    pub fn available(&self) -> Option<f64> {
        match self {
            BalanceState::Ready(b) => Some(b.available),
            BalanceState::Provisioning => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wallet {
    #[serde(default, deserialize_with = "flex::string_or_number")]
    pub id: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub kind: String,

    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    pub balance: f64,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub address: Option<String>,
}
