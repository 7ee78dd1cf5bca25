use axum::{Router, routing::get};
use crate::{AppState, controllers::home_controller, events};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/", get(home_controller::home))
        .route("/health", get(home_controller::health))
        .route("/balance", get(home_controller::get_balance_panel))
        .route("/wallets", get(home_controller::get_wallets))
        .route("/events", get(events::sse_events))
}
