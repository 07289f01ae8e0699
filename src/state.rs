use std::sync::Arc;

use crate::auth::{SessionStore, UserDirectory};
use crate::config::Args;
use crate::rate_limit::RateLimiter;

// app's shared state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Args>,
    pub limiter: Arc<RateLimiter>,
    pub users: Arc<UserDirectory>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Args, users: UserDirectory) -> Self {
        let sessions = SessionStore::new(config.session_ttl());
        Self {
            config: Arc::new(config),
            limiter: Arc::new(RateLimiter::new()),
            users: Arc::new(users),
            sessions: Arc::new(sessions),
        }
    }
}
