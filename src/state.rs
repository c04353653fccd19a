use std::sync::Arc;

use chrono::Duration;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::Config;
use crate::store::{CredentialStore, MemoryStore, TaskStore, UserRepository};

/// Shared, request-independent services handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialStore,
    pub tasks: Arc<dyn TaskStore>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskStore>,
        tokens: TokenService,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            credentials: CredentialStore::new(users, hasher),
            tasks,
            tokens: Arc::new(tokens),
        }
    }

    /// Wires both stores to one backend using the configured secret and cost.
    pub fn from_config<S>(config: &Config, store: Arc<S>) -> Self
    where
        S: UserRepository + TaskStore + 'static,
    {
        if config.jwt_secret_is_fallback {
            log::warn!("JWT_SECRET is not set; using the insecure development secret");
        }
        Self::new(
            store.clone(),
            store,
            TokenService::new(
                &config.jwt_secret,
                Duration::hours(config.token_validity_hours),
            ),
            PasswordHasher::new(config.bcrypt_cost),
        )
    }

    /// State over a fresh [`MemoryStore`].
    pub fn in_memory(secret: &str, bcrypt_cost: u32) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(
            store.clone(),
            store,
            TokenService::new(secret, Duration::hours(24)),
            PasswordHasher::new(bcrypt_cost),
        )
    }
}
