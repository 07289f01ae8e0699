use std::time::{Duration, Instant};

use dashmap::DashMap;

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub created_at: Instant,
}

// opaque bearer tokens -> user id, expiring after `ttl`
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn create(&self, user_id: &str) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            token.clone(),
            Session {
                user_id: user_id.to_owned(),
                created_at: Instant::now(),
            },
        );
        tracing::debug!(user_id, sessions = self.sessions.len(), "session created");
        token
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        let entry = self.sessions.get(token)?;
        if entry.created_at.elapsed() > self.ttl {
            drop(entry);
            self.sessions.remove(token);
            return None;
        }
        Some(entry.clone())
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn cleanup_expired(&self) -> usize {
        let ttl = self.ttl;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.created_at.elapsed() <= ttl);
        before.saturating_sub(self.sessions.len())
    }
}
