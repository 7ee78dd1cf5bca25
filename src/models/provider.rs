use serde::{Deserialize, Serialize};

use super::flex;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Provider {
    #[serde(default, deserialize_with = "flex::string_or_number")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    // percent, e.g. 2.0 == 2%
    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    pub fee_percent: f64,

    #[serde(default)]
    pub currencies: Vec<String>,

    // what the user has to fill in for payouts ("IBAN", "M-Pesa number", ...)
    #[serde(default, deserialize_with = "flex::opt_string")]
    pub payout_hint: Option<String>,
}

impl Provider {
    pub fn supports(&self, currency: &str) -> bool {
        self.currencies.is_empty()
            || self
                .currencies
                .iter()
                .any(|c| c.eq_ignore_ascii_case(currency))
    }
}
