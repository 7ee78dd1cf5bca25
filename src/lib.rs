//! Library entrypoint for RustWallet.
//!
//! Integration tests under `tests/` import the app state, routers and
//! controllers from here.

use std::{sync::Arc, time::Duration};

pub mod config;
pub mod error;
pub mod models;

#[path = "middleware/auth.rs"]
pub mod auth;
#[path = "middleware/wizard.rs"]
pub mod wizard_scope;

pub mod services;

#[path = "views/render.rs"]
pub mod render;
#[path = "views/templates.rs"]
pub mod templates;

pub mod controllers;
pub mod events;
pub mod routes;

use services::{
    price_feed::PriceFeedClient, quote_service::QuoteDebouncer, sell_wizard::WizardStore,
    wallet_api::WalletApiClient,
};

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub settings: config::Settings,
    pub api: WalletApiClient,
    pub prices: PriceFeedClient,
    pub quotes: QuoteDebouncer,
    pub wizards: WizardStore,
    pub events_tx: tokio::sync::broadcast::Sender<String>,
}

impl AppState {
    pub fn new(settings: config::Settings, hbs: templates::Hbs) -> Self {
        let api = WalletApiClient::new(settings.wallet_api_url.clone());
        let prices = PriceFeedClient::new(settings.price_feed_url.clone());
        let quotes = QuoteDebouncer::new(
            Arc::new(api.clone()),
            Duration::from_millis(settings.quote_debounce_ms),
        );
        let (events_tx, _events_rx) = tokio::sync::broadcast::channel::<String>(64);

        Self {
            hbs,
            settings,
            api,
            prices,
            quotes,
            wizards: WizardStore::new(),
            events_tx,
        }
    }

    /// Tells connected browsers to refresh a panel. Nobody listening is fine.
    pub fn notify(&self, event: &str) {
        let _ = self.events_tx.send(event.to_string());
    }
}
