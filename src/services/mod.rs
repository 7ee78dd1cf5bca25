pub mod wallet_api;
pub mod price_feed;

pub mod auth_service;
pub mod order_status;
pub mod sell_wizard;
pub mod quote_service;
pub mod invoice;
pub mod qr_scan;
