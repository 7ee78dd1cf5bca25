use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::lightning_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/lightning", get(lightning_controller::get_lightning))
        .route("/lightning/transactions", get(lightning_controller::get_ln_transactions))
        .route("/lightning/invoice", post(lightning_controller::post_invoice))
        .route("/lightning/pay", post(lightning_controller::post_pay))
        .route("/lightning/scan", post(lightning_controller::post_scan))
}
