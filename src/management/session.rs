use std::sync::Arc;

use crate::{
    error::StoreError,
    management::{SessionCache, SessionStore},
    types::{Session, SessionStatus, TokenGrant},
    utils,
};

/// Exclusive owner of all session records.
///
/// Every mutation of a session goes through here: creation at `/login`,
/// completion at `/callback`, refresh application from the token lifecycle,
/// and removal by the idle sweep.
pub struct SessionRegistry {
    store: Arc<dyn SessionStore>,
    cache: Option<SessionCache>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn SessionStore>, cache: Option<SessionCache>) -> Self {
        SessionRegistry { store, cache }
    }

    /// Creates a fresh, unauthenticated session.
    pub async fn create(&self, redirect_after_login: Option<String>) -> Session {
        let now = utils::now_ts();
        let session_id = loop {
            let candidate = utils::generate_session_id();
            if self.store.get(&candidate).await.is_none() {
                break candidate;
            }
        };

        let session = Session {
            session_id,
            created_at: now,
            last_used_at: now,
            access_token: None,
            refresh_token: None,
            expires_at: 0,
            redirect_after_login,
        };
        self.store.set(session.clone()).await;
        session
    }

    pub async fn get(&self, session_id: &str) -> Option<Session> {
        self.store.get(session_id).await
    }

    /// Updates `last_used_at` and returns the refreshed record.
    pub async fn touch(&self, session_id: &str) -> Option<Session> {
        let mut session = self.store.get(session_id).await?;
        session.last_used_at = utils::now_ts();
        self.store.set(session.clone()).await;
        Some(session)
    }

    /// Stores the token pair obtained from the authorization-code exchange.
    pub async fn complete_login(&self, session_id: &str, grant: &TokenGrant) -> Option<Session> {
        self.apply_grant(session_id, grant).await
    }

    /// Stores the outcome of a refresh exchange. The access token, refresh
    /// token and expiry move together; the old refresh token is retained
    /// when the server does not rotate it.
    pub async fn apply_refresh(&self, session_id: &str, grant: &TokenGrant) -> Option<Session> {
        self.apply_grant(session_id, grant).await
    }

    async fn apply_grant(&self, session_id: &str, grant: &TokenGrant) -> Option<Session> {
        let mut session = self.store.get(session_id).await?;
        let now = utils::now_ts();
        session.access_token = Some(grant.access_token.clone());
        if let Some(refresh_token) = &grant.refresh_token {
            session.refresh_token = Some(refresh_token.clone());
        }
        session.expires_at = now + grant.expires_in;
        session.last_used_at = now;
        self.store.set(session.clone()).await;
        Some(session)
    }

    pub async fn delete(&self, session_id: &str) {
        self.store.delete(session_id).await;
    }

    /// Removes sessions idle for longer than `retention_secs`. A session
    /// last used exactly at the boundary is retained.
    pub async fn sweep(&self, retention_secs: u64) -> usize {
        let cutoff = utils::now_ts().saturating_sub(retention_secs);
        let expired = self.store.list_expired(cutoff).await;
        for session_id in &expired {
            self.store.delete(session_id).await;
        }
        expired.len()
    }

    pub async fn status(&self, session_id: &str) -> SessionStatus {
        let Some(session) = self.store.get(session_id).await else {
            return SessionStatus::missing();
        };

        let now = utils::now_ts();
        SessionStatus {
            valid: true,
            token_valid: session.access_token.is_some() && session.expires_at > now,
            expires_in: session.expires_in(now),
            can_refresh: session.refresh_token.is_some(),
            session_age: now.saturating_sub(session.created_at),
        }
    }

    /// Writes the refresh-recoverable state to the session cache, when one
    /// is configured. Takes a snapshot first; no store lock is held across
    /// the file write.
    pub async fn persist(&self) -> Result<(), StoreError> {
        let Some(cache) = &self.cache else {
            return Ok(());
        };

        let snapshot = self.store.snapshot().await;
        cache.persist(&snapshot).await
    }

    /// Reloads persisted sessions and merges them into the store. Sessions
    /// already present win; restored ones start without an access token and
    /// recover one through their first refresh.
    pub async fn restore(&self) -> Result<usize, StoreError> {
        let Some(cache) = &self.cache else {
            return Ok(0);
        };

        let persisted = cache.load().await?;
        let mut restored = 0;
        for (session_id, entry) in persisted {
            if self.store.get(&session_id).await.is_some() {
                continue;
            }
            self.store
                .set(Session {
                    session_id,
                    created_at: entry.created_at,
                    last_used_at: entry.last_used_at,
                    access_token: None,
                    refresh_token: Some(entry.refresh_token),
                    expires_at: 0,
                    redirect_after_login: None,
                })
                .await;
            restored += 1;
        }
        Ok(restored)
    }
}
