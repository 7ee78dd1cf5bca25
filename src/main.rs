use std::net::SocketAddr;

use rustwallet::{config, routes, templates, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();
    let hbs = templates::build_handlebars().expect("templates must compile");
    let state = AppState::new(settings.clone(), hbs);

    let app = routes::app(state);

    let ip = settings
        .host
        .parse::<std::net::IpAddr>()
        .expect("HOST must be an IP address");
    let addr = SocketAddr::from((ip, settings.port));
    tracing::info!(wallet_api = %settings.wallet_api_url, "listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("bind listener");
    axum::serve(listener, app).await.expect("server error");
}
