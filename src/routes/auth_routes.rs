use axum::{Router, routing::get};
use crate::{AppState, controllers::{auth_controller, profile_controller}};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/login", get(auth_controller::get_login).post(auth_controller::post_login))
        .route("/logout", get(auth_controller::logout).post(auth_controller::logout))
        .route("/profile", get(profile_controller::get_profile))
}
