use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::{buy_controller, orders_controller}};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/orders", get(orders_controller::get_orders))
        .route("/orders/rows", get(orders_controller::get_order_rows))
        .route("/orders/:id", get(orders_controller::get_order))
        .route("/orders/:id/panel", get(orders_controller::get_order_panel))
        .route("/orders/:id/payment-proof", post(orders_controller::post_payment_proof))
        .route("/buy", get(buy_controller::get_buy).post(buy_controller::post_buy))
        .route("/buy/quote", post(buy_controller::post_buy_quote))
}
