use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::{
    config, info,
    management::{MemoryStore, SessionCache, SessionRegistry, TokenManager},
    server::{self, AppState},
    spotify::{
        auth::{AccountsClient, TokenExchange},
        player::{PlayerApi, WebApiClient},
    },
    success, warning,
};

/// Runs the relay server until the process is stopped.
///
/// With persistence enabled (the default), previously stored sessions are
/// restored before serving and the session cache is rewritten on a fixed
/// interval; `ephemeral` keeps everything in memory.
pub async fn serve(ephemeral: bool) {
    let store = Arc::new(MemoryStore::new());
    let cache = if ephemeral {
        None
    } else {
        Some(SessionCache::new())
    };
    let registry = Arc::new(SessionRegistry::new(store, cache));

    match registry.restore().await {
        Ok(0) => {}
        Ok(n) => info!("Restored {} persisted session(s)", n),
        Err(e) => warning!("No session cache restored: {}", e),
    }

    let exchange: Arc<dyn TokenExchange> = Arc::new(AccountsClient::new());
    let player: Arc<dyn PlayerApi> = Arc::new(WebApiClient::new());
    let tokens = Arc::new(TokenManager::new(
        Arc::clone(&registry),
        Arc::clone(&exchange),
        config::token_refresh_margin_secs(),
    ));

    let state = Arc::new(AppState {
        registry: Arc::clone(&registry),
        tokens,
        exchange,
        player,
    });

    let sweep_registry = Arc::clone(&registry);
    tokio::spawn(async move {
        let retention = config::session_retention_secs();
        let interval = Duration::from_secs(config::session_sweep_interval_secs());
        loop {
            sleep(interval).await;
            let removed = sweep_registry.sweep(retention).await;
            if removed > 0 {
                info!("Swept {} idle session(s)", removed);
            }
        }
    });

    if !ephemeral {
        let persist_registry = Arc::clone(&registry);
        tokio::spawn(async move {
            let interval = Duration::from_secs(config::session_persist_interval_secs());
            loop {
                sleep(interval).await;
                if let Err(e) = persist_registry.persist().await {
                    warning!("Failed to persist session cache: {}", e);
                }
            }
        });
    }

    success!("Relay listening on {}", config::server_addr());
    server::start_api_server(state).await;
}
