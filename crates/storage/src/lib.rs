use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use orchid_core::ChatSession;
use parking_lot::RwLock;

/// Chat session persistence seam. The only implementation is in-memory:
/// session logs live for the duration of the process and are dropped on
/// restart, matching the demo's per-page-load lifecycle.
pub trait SessionRepository: Send + Sync {
    async fn load_session(&self, session_id: &str) -> Result<Option<ChatSession>>;
    async fn upsert_session(&self, session: &ChatSession) -> Result<()>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    sessions: Arc<RwLock<HashMap<String, ChatSession>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepository for MemoryStore {
    async fn load_session(&self, session_id: &str) -> Result<Option<ChatSession>> {
        Ok(self.sessions.read().get(session_id).cloned())
    }

    async fn upsert_session(&self, session: &ChatSession) -> Result<()> {
        self.sessions
            .write()
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut removed = 0_u64;
        self.sessions.write().retain(|_, value| {
            let keep = value.expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(id: &str, expires_at: DateTime<Utc>) -> ChatSession {
        ChatSession {
            session_id: id.to_string(),
            expires_at,
            messages: Vec::new(),
        }
    }

    #[tokio::test]
    async fn upsert_then_load_round_trips() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .upsert_session(&session("s1", now + Duration::hours(24)))
            .await
            .unwrap();

        let loaded = store.load_session("s1").await.unwrap();
        assert_eq!(loaded.map(|value| value.session_id).as_deref(), Some("s1"));
        assert!(store.load_session("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purge_removes_only_expired_sessions() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .upsert_session(&session("stale", now - Duration::minutes(1)))
            .await
            .unwrap();
        store
            .upsert_session(&session("live", now + Duration::hours(1)))
            .await
            .unwrap();

        let removed = store.purge_expired(now).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.load_session("stale").await.unwrap().is_none());
        assert!(store.load_session("live").await.unwrap().is_some());
    }
}
