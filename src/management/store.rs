use std::{collections::HashMap, path::PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    error::StoreError,
    types::{PersistedSession, Session},
};

/// Key-value storage behind the session registry.
///
/// The registry and the token lifecycle only ever go through this trait, so
/// the backing store can be swapped without touching request logic.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Option<Session>;
    async fn set(&self, session: Session);
    async fn delete(&self, session_id: &str);
    /// Ids of sessions whose `last_used_at` strictly predates `cutoff`.
    async fn list_expired(&self, cutoff: u64) -> Vec<String>;
    /// Refresh-recoverable view of all sessions, keyed by id. Sessions that
    /// never completed login carry nothing worth keeping and are skipped.
    async fn snapshot(&self) -> HashMap<String, PersistedSession>;
}

/// Default in-memory store.
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.lock().await.get(session_id).cloned()
    }

    async fn set(&self, session: Session) {
        self.sessions
            .lock()
            .await
            .insert(session.session_id.clone(), session);
    }

    async fn delete(&self, session_id: &str) {
        self.sessions.lock().await.remove(session_id);
    }

    async fn list_expired(&self, cutoff: u64) -> Vec<String> {
        self.sessions
            .lock()
            .await
            .values()
            .filter(|s| s.last_used_at < cutoff)
            .map(|s| s.session_id.clone())
            .collect()
    }

    async fn snapshot(&self) -> HashMap<String, PersistedSession> {
        self.sessions
            .lock()
            .await
            .values()
            .filter_map(|s| {
                let refresh_token = s.refresh_token.clone()?;
                Some((
                    s.session_id.clone(),
                    PersistedSession {
                        refresh_token,
                        created_at: s.created_at,
                        last_used_at: s.last_used_at,
                    },
                ))
            })
            .collect()
    }
}

/// File-backed mirror of the refresh-recoverable session state.
///
/// Written on a fixed interval and after every successful refresh, reloaded
/// on startup. Access tokens never touch disk.
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    pub fn new() -> Self {
        SessionCache {
            path: Self::default_path(),
        }
    }

    pub fn at(path: PathBuf) -> Self {
        SessionCache { path }
    }

    pub async fn persist(
        &self,
        snapshot: &HashMap<String, PersistedSession>,
    ) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub async fn load(&self) -> Result<HashMap<String, PersistedSession>, StoreError> {
        let content = async_fs::read_to_string(&self.path).await?;
        let sessions: HashMap<String, PersistedSession> = serde_json::from_str(&content)?;
        Ok(sessions)
    }

    fn default_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("spotrelay/cache/sessions.json");
        path
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}
