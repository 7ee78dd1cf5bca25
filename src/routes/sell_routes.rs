use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::sell_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/sell", get(sell_controller::get_sell))
        .route("/sell/step", get(sell_controller::get_sell_step))
        .route("/sell/amount", post(sell_controller::post_sell_amount))
        .route("/sell/provider", post(sell_controller::post_sell_provider))
        .route("/sell/back", post(sell_controller::post_sell_back))
        .route("/sell/quote", post(sell_controller::post_sell_quote))
}
