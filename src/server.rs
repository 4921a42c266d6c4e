use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};

use crate::{
    api, config, error,
    management::{SessionRegistry, TokenManager},
    spotify::{auth::TokenExchange, player::PlayerApi},
};

/// Shared state handed to every request handler.
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub tokens: Arc<TokenManager>,
    pub exchange: Arc<dyn TokenExchange>,
    pub player: Arc<dyn PlayerApi>,
}

pub async fn start_api_server(state: Arc<AppState>) {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/login", get(api::login))
        .route("/callback", get(api::callback))
        .route("/token", get(api::token))
        .route("/session-status", get(api::session_status))
        .route("/seek", get(api::seek))
        .route("/play", get(api::play))
        .route("/pause", get(api::pause))
        .route("/next", get(api::next))
        .route("/previous", get(api::previous))
        .route("/current-playback", get(api::current_playback))
        .layer(Extension(state));

    let addr = match SocketAddr::from_str(&config::server_addr()) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
