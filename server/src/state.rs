use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::auth::{PasswordHasher, SessionManager};
use crate::config::Config;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub passwords: PasswordHasher,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        Self {
            store,
            passwords: PasswordHasher::new(config.bcrypt_cost),
            sessions: SessionManager::new(config.session_key.clone(), config.production),
        }
    }
}

// Lets `SignedCookieJar` be used as a handler argument.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.key().clone()
    }
}
