use models::Selection;
use rates_client::RateProvider;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use crate::controller::InteractionController;
use crate::error::{ApiError, Result};

/// Sessions untouched for this long are dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// A session's controller. The mutex is held for a whole submit, so
/// submits on one session run one after another.
pub type SharedController = Arc<Mutex<InteractionController>>;

struct SessionEntry {
    controller: SharedController,
    last_seen: Instant,
}

/// Live sessions keyed by id. Sessions never share render state.
///
/// Idle sessions expire after `ttl`; expiry is checked on every insert and lookup.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn prune(&self, sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < self.ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            tracing::debug!(expired, "dropped idle sessions");
        }
    }

    pub async fn insert(&self, controller: InteractionController) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions, now);
        sessions.insert(
            id,
            SessionEntry {
                controller: Arc::new(Mutex::new(controller)),
                last_seen: now,
            },
        );
        id
    }

    /// Looks a session up and marks it as used.
    pub async fn get(&self, id: Uuid) -> Result<SharedController> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions, now);
        let entry = sessions.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;
        entry.last_seen = now;
        Ok(Arc::clone(&entry.controller))
    }

    pub async fn remove(&self, id: Uuid) -> Result<()> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(ApiError::SessionNotFound(id))
    }

    /// Number of stored sessions, idle ones included until the next prune.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Shared handler state: the rate provider, the sessions and the startup selection.
pub struct AppState {
    pub provider: Arc<dyn RateProvider>,
    pub sessions: SessionStore,
    pub defaults: Selection,
}

impl AppState {
    pub fn new(provider: Arc<dyn RateProvider>, defaults: Selection) -> Self {
        Self {
            provider,
            sessions: SessionStore::default(),
            defaults,
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.sessions = SessionStore::new(ttl);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::FakeProvider;

    async fn controller() -> InteractionController {
        InteractionController::start(&FakeProvider::default(), Selection::default()).await
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_expires() {
        let store = SessionStore::new(Duration::from_secs(60));
        let id = store.insert(controller().await).await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(store.get(id).await.is_ok());

        // the lookup above refreshed it
        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(store.get(id).await.is_ok());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(matches!(
            store.get(id).await,
            Err(ApiError::SessionNotFound(missing)) if missing == id
        ));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_drops_idle_sessions() {
        let store = SessionStore::new(Duration::from_secs(10));
        for _ in 0..5 {
            store.insert(controller().await).await;
        }
        assert_eq!(store.len().await, 5);

        tokio::time::advance(Duration::from_secs(11)).await;
        let fresh = store.insert(controller().await).await;

        assert_eq!(store.len().await, 1);
        assert!(store.get(fresh).await.is_ok());
    }

    #[tokio::test]
    async fn test_remove_unknown_session() {
        let store = SessionStore::default();
        assert_eq!(store.ttl(), DEFAULT_SESSION_TTL);
        assert!(store.remove(Uuid::new_v4()).await.is_err());
    }
}
