use std::collections::HashMap;

use reqwest::Client;

use crate::error::ApiError;

/// Third-party spot price feed (CoinGecko `simple/price` shape).
#[derive(Clone)]
pub struct PriceFeedClient {
    http: Client,
    base_url: String,
}

// {"bitcoin": {"usd": 64000.12}}
type SimplePrice = HashMap<String, HashMap<String, f64>>;

impl PriceFeedClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn btc_price(&self, currency: &str) -> Result<f64, ApiError> {
        let vs = currency.trim().to_lowercase();
        let url = format!("{}/simple/price", self.base_url);

        let res = self
            .http
            .get(url)
            .query(&[("ids", "bitcoin"), ("vs_currencies", vs.as_str())])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let body = res.json::<SimplePrice>().await?;

        body.get("bitcoin")
            .and_then(|m| m.get(&vs))
            .copied()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| ApiError::Decode(format!("no bitcoin price for {vs}")))
    }
}
