use std::sync::Arc;

use crate::auth::password::MAX_PASSWORD_BYTES;
use crate::auth::PasswordHasher;
use crate::error::AppError;
use crate::models::{User, UserId};

use super::UserRepository;

/// User accounts on top of a [`UserRepository`].
///
/// Every credential written through here goes through [`PasswordHasher::hash`],
/// and [`PasswordHasher::check`] is the only comparison path. bcrypt work runs
/// on the blocking thread pool.
#[derive(Clone)]
pub struct CredentialStore {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl CredentialStore {
    pub fn new(repo: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    pub async fn create_user(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let password_hash = self.hash(password).await?;
        let user = self.repo.insert(email, name, &password_hash).await?;
        log::info!("Created user {}", user.id);
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        self.repo.find_by_email(email).await
    }

    pub async fn find_by_id(&self, id: UserId) -> Result<User, AppError> {
        self.repo.find_by_id(id).await
    }

    pub async fn update_profile(&self, id: UserId, name: &str) -> Result<User, AppError> {
        self.repo.update_name(id, name).await
    }

    /// Checks an email/password pair and returns the matching user.
    ///
    /// Unknown emails and wrong passwords fail identically. A legacy digest
    /// credential that matches is replaced by a bcrypt hash before returning.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let credentials = match self.repo.find_credentials_by_email(email).await {
            Ok(credentials) => credentials,
            Err(AppError::NotFound(_)) => {
                let hasher = self.hasher;
                let candidate = password.to_string();
                run_blocking(move || Ok(hasher.check_missing(&candidate))).await?;
                log::info!("Login failed: unknown email");
                return Err(invalid_credentials());
            }
            Err(e) => return Err(e),
        };

        let stored = credentials.password_hash.clone();
        let hasher = self.hasher;
        let candidate = password.to_string();
        let valid = run_blocking(move || Ok(hasher.check(&stored, &candidate))).await?;
        if !valid {
            log::info!("Login failed: bad password for user {}", credentials.user.id);
            return Err(invalid_credentials());
        }

        if self.hasher.needs_rehash(&credentials.password_hash) {
            if password.len() > MAX_PASSWORD_BYTES {
                log::warn!(
                    "Legacy credential for user {} kept: password too long for bcrypt",
                    credentials.user.id
                );
                return Ok(credentials.user);
            }
            let password_hash = self.hash(password).await?;
            self.repo
                .update_password_hash(credentials.user.id, &password_hash)
                .await?;
            log::info!(
                "Migrated legacy credential for user {}",
                credentials.user.id
            );
        }

        Ok(credentials.user)
    }

    /// Replaces the password of the user registered under `email`.
    pub async fn reset_password(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self.repo.find_by_email(email).await?;
        let password_hash = self.hash(password).await?;
        self.repo.update_password_hash(user.id, &password_hash).await?;
        log::info!("Password reset for user {}", user.id);
        Ok(user)
    }

    async fn hash(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.hasher;
        let password = password.to_string();
        run_blocking(move || hasher.hash(&password)).await
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".into())
}

async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Password worker failed: {}", e)))?
}
