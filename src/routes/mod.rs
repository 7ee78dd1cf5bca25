use axum::Router;
use axum::middleware::from_fn_with_state;
use tower_http::services::ServeDir;

use crate::{AppState, controllers::home_controller};

pub mod home_routes;
pub mod auth_routes;
pub mod orders_routes;
pub mod sell_routes;
pub mod lightning_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = auth_routes::add_routes(router);
    let router = orders_routes::add_routes(router);
    let router = sell_routes::add_routes(router);
    let router = lightning_routes::add_routes(router);

    // last layer added runs first: inject the session, then scope the
    // wizard, then gate on auth
    router
        .nest_service("/static", ServeDir::new("static"))
        .fallback(home_controller::not_found)
        .layer(from_fn_with_state(state.clone(), crate::auth::require_auth))
        .layer(from_fn_with_state(state.clone(), crate::wizard_scope::discard_on_navigation))
        .layer(from_fn_with_state(state.clone(), crate::auth::inject_session))
        .with_state(state)
}
