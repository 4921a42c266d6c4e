use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::Mutex;

use crate::{
    error::AuthFailure, management::SessionRegistry, spotify::auth::TokenExchange, types::Session,
    utils, warning,
};

/// Refresh attempts before a session is reported as denied.
pub const REFRESH_ATTEMPTS: u32 = 3;
/// Fixed delay between refresh attempts.
pub const REFRESH_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Guarantees a non-expired access token per session.
///
/// Refreshes proactively when the token expires within the safety margin,
/// and reactively when the Web API rejects a token the clock still
/// considered valid. Refreshes are serialized per session: concurrent
/// callers near expiry share one in-flight exchange instead of racing the
/// accounts service for the same refresh token.
pub struct TokenManager {
    registry: Arc<SessionRegistry>,
    exchange: Arc<dyn TokenExchange>,
    margin: u64,
    refresh_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TokenManager {
    pub fn new(
        registry: Arc<SessionRegistry>,
        exchange: Arc<dyn TokenExchange>,
        margin: u64,
    ) -> Self {
        TokenManager {
            registry,
            exchange,
            margin,
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns an access token valid for at least the safety margin,
    /// refreshing first when needed. Never returns a token already expired
    /// at return time.
    pub async fn ensure_valid_token(&self, session_id: &str) -> Result<String, AuthFailure> {
        let session = self
            .registry
            .touch(session_id)
            .await
            .ok_or(AuthFailure::InvalidSession)?;

        let now = utils::now_ts();
        if session.has_fresh_token(now, self.margin) {
            if let Some(token) = &session.access_token {
                return Ok(token.clone());
            }
        }

        let lock = self.lock_for(session_id).await;
        let _guard = lock.lock().await;

        // Re-read under the lock: a concurrent caller may have refreshed
        // while this one waited.
        let session = self
            .registry
            .get(session_id)
            .await
            .ok_or(AuthFailure::InvalidSession)?;
        let now = utils::now_ts();
        if session.has_fresh_token(now, self.margin) {
            if let Some(token) = &session.access_token {
                return Ok(token.clone());
            }
        }

        self.refresh_locked(&session).await
    }

    /// Refreshes regardless of the local expiry check. Used after an
    /// upstream 401, where the server rather than the clock declared the
    /// token invalid. `stale_token` is the token that was rejected; if
    /// another caller already replaced it, the replacement is returned
    /// without a second exchange.
    pub async fn force_refresh(
        &self,
        session_id: &str,
        stale_token: &str,
    ) -> Result<String, AuthFailure> {
        let lock = self.lock_for(session_id).await;
        let _guard = lock.lock().await;

        let session = self
            .registry
            .get(session_id)
            .await
            .ok_or(AuthFailure::InvalidSession)?;
        if let Some(token) = &session.access_token {
            if token != stale_token {
                return Ok(token.clone());
            }
        }

        self.refresh_locked(&session).await
    }

    /// Performs the refresh exchange with bounded retries. Caller must hold
    /// the session's refresh lock.
    async fn refresh_locked(&self, session: &Session) -> Result<String, AuthFailure> {
        let Some(refresh_token) = session.refresh_token.clone() else {
            return Err(AuthFailure::RefreshDenied(
                "no refresh token on file".to_string(),
            ));
        };

        let mut attempt = 1;
        loop {
            match self.exchange.exchange_refresh(&refresh_token).await {
                Ok(grant) => {
                    self.registry
                        .apply_refresh(&session.session_id, &grant)
                        .await
                        .ok_or(AuthFailure::InvalidSession)?;
                    if let Err(e) = self.registry.persist().await {
                        warning!("Failed to persist session cache: {}", e);
                    }
                    return Ok(grant.access_token);
                }
                Err(e) if attempt < REFRESH_ATTEMPTS => {
                    warning!(
                        "Token refresh attempt {}/{} failed: {}",
                        attempt,
                        REFRESH_ATTEMPTS,
                        e
                    );
                    attempt += 1;
                    tokio::time::sleep(REFRESH_RETRY_DELAY).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn lock_for(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.refresh_locks.lock().await;
        // Drop lock entries nobody is waiting on; swept sessions must not
        // pin their locks forever.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
