use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    error::ApiError,
    models::{
        flex::ListOrPage, Balance, BalanceState, FeeQuote, Invoice, LightningTransaction, NewOrder,
        Order, PaymentResult, Provider, QuoteInput, UserProfile, Wallet,
    },
};

/// Typed client for the external wallet/orders API.
///
/// Every authenticated call sends `Authorization: Token <t>`. There is no
/// timeout or retry here: failures go straight back to the calling view.
#[derive(Clone)]
pub struct WalletApiClient {
    http: Client,
    base_url: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    // some deployments answer with the DRF-style "key"
    #[serde(default)]
    key: Option<String>,
}

#[derive(Serialize)]
struct PaymentProofRequest<'a> {
    payment_proof: &'a str,
}

#[derive(Serialize)]
struct InvoiceRequest<'a> {
    amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    memo: Option<&'a str>,
}

#[derive(Serialize)]
struct PayRequest<'a> {
    payment_request: &'a str,
}

/// Order ids come from the URL; only let plain ids through to the API path.
fn order_path(id: &str) -> Result<String, ApiError> {
    let id = id.trim();
    let plain = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !plain {
        return Err(ApiError::Status {
            status: StatusCode::NOT_FOUND,
            body: r#"{"detail":"Order not found."}"#.to_string(),
        });
    }
    Ok(format!("/orders/{id}/"))
}

impl WalletApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder, token: &str) -> RequestBuilder {
        req.header(header::AUTHORIZATION, format!("Token {token}"))
    }

    async fn read<T: DeserializeOwned>(res: Response) -> Result<T, ApiError> {
        let status = res.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if status == StatusCode::FORBIDDEN {
            return Err(ApiError::Forbidden);
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let bytes = res.bytes().await?;
        serde_json::from_slice::<T>(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<T, ApiError> {
        let res = self
            .authed(self.http.get(self.url(path)), token)
            .send()
            .await?;
        Self::read(res).await
    }

    async fn get_list<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<Vec<T>, ApiError> {
        let page: ListOrPage<T> = self.get(token, path).await?;
        Ok(page.into_vec())
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, token: &str, path: &str, body: &B) -> Result<T, ApiError> {
        let res = self
            .authed(self.http.post(self.url(path)), token)
            .json(body)
            .send()
            .await?;
        Self::read(res).await
    }

    /// Exchanges credentials for a session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let res = self
            .http
            .post(self.url("/auth/login/"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let body: LoginResponse = Self::read(res).await?;
        body.token
            .or(body.key)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::Decode("login response carried no token".to_string()))
    }

    pub async fn profile(&self, token: &str) -> Result<UserProfile, ApiError> {
        self.get(token, "/auth/user/").await
    }

    /// 403 is not an error here: the wallet is still being provisioned.
    pub async fn balance(&self, token: &str) -> Result<BalanceState, ApiError> {
        match self.get::<Balance>(token, "/wallet/balance/").await {
            Ok(b) => Ok(BalanceState::Ready(b)),
            Err(ApiError::Forbidden) => Ok(BalanceState::Provisioning),
            Err(e) => Err(e),
        }
    }

    pub async fn wallets(&self, token: &str) -> Result<Vec<Wallet>, ApiError> {
        self.get_list(token, "/wallet/wallets/").await
    }

    pub async fn buy_providers(&self, token: &str) -> Result<Vec<Provider>, ApiError> {
        self.get_list(token, "/providers/buy/").await
    }

    pub async fn sell_providers(&self, token: &str) -> Result<Vec<Provider>, ApiError> {
        self.get_list(token, "/providers/sell/").await
    }

    pub async fn calculate_fee(&self, token: &str, input: &QuoteInput) -> Result<FeeQuote, ApiError> {
        self.post(token, "/orders/calculate-fee/", input).await
    }

    pub async fn create_order(&self, token: &str, order: &NewOrder) -> Result<Order, ApiError> {
        self.post(token, "/orders/", order).await
    }

    pub async fn get_order(&self, token: &str, id: &str) -> Result<Order, ApiError> {
        self.get(token, &order_path(id)?).await
    }

    pub async fn list_orders(&self, token: &str) -> Result<Vec<Order>, ApiError> {
        self.get_list(token, "/orders/").await
    }

    pub async fn submit_payment_proof(&self, token: &str, id: &str, proof: &str) -> Result<Order, ApiError> {
        let res = self
            .authed(self.http.patch(self.url(&order_path(id)?)), token)
            .json(&PaymentProofRequest { payment_proof: proof })
            .send()
            .await?;
        Self::read(res).await
    }

    pub async fn generate_invoice(&self, token: &str, amount_sats: i64, memo: Option<&str>) -> Result<Invoice, ApiError> {
        self.post(
            token,
            "/lightning/invoices/",
            &InvoiceRequest { amount: amount_sats, memo },
        )
        .await
    }

    pub async fn pay_invoice(&self, token: &str, payment_request: &str) -> Result<PaymentResult, ApiError> {
        self.post(token, "/lightning/payments/", &PayRequest { payment_request })
            .await
    }

    pub async fn lightning_transactions(&self, token: &str) -> Result<Vec<LightningTransaction>, ApiError> {
        self.get_list(token, "/lightning/transactions/").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_path_rejects_traversal() {
        assert_eq!(order_path(" 42 ").unwrap(), "/orders/42/");
        assert_eq!(order_path("a1-b2_c3").unwrap(), "/orders/a1-b2_c3/");
        assert!(order_path("../wallet/balance").is_err());
        assert!(order_path("").is_err());
    }
}
