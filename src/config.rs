use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    // external wallet/orders API, e.g. https://api.example.com/api
    pub wallet_api_url: String,
    pub price_feed_url: String,
    pub display_currency: String,

    pub session_cookie_name: String,
    pub cookie_secure: bool,

    pub quote_debounce_ms: u64,
}

fn trim_base(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let wallet_api_url = env::var("WALLET_API_URL")
        .map(trim_base)
        .unwrap_or_else(|_| "http://127.0.0.1:8000/api".to_string());

    let price_feed_url = env::var("PRICE_FEED_URL")
        .map(trim_base)
        .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".to_string());

    let display_currency = env::var("DISPLAY_CURRENCY")
        .map(|c| c.trim().to_uppercase())
        .ok()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "USD".to_string());

    let session_cookie_name = env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "wallet_token".to_string());

    let cookie_secure = env::var("COOKIE_SECURE")
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    let quote_debounce_ms = env::var("QUOTE_DEBOUNCE_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(400);

    Settings {
        host,
        port,
        wallet_api_url,
        price_feed_url,
        display_currency,
        session_cookie_name,
        cookie_secure,
        quote_debounce_ms,
    }
}
