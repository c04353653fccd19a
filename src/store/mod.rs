//! Persistence contracts and their backends.
//!
//! [`UserRepository`] and [`TaskStore`] are the only paths to persisted state.
//! Every task operation that takes a task id also takes the acting owner, and
//! backends must apply both in a single predicate: a task owned by someone else
//! is reported exactly like a task that does not exist.

pub mod credentials;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Task, TaskInput, TaskQuery, User, UserCredentials, UserId};

pub use credentials::CredentialStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;

pub(crate) fn user_not_found() -> AppError {
    AppError::NotFound("User not found".into())
}

pub(crate) fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

pub(crate) fn duplicate_email() -> AppError {
    AppError::Conflict("User with this email already exists".into())
}

/// Raw user persistence. Password values are always already hashed here.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user. Fails with `Conflict` when the email is taken.
    async fn insert(&self, email: &str, name: &str, password_hash: &str) -> Result<User, AppError>;

    async fn find_by_id(&self, id: UserId) -> Result<User, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<User, AppError>;

    /// Login-verification path: the only read that returns the stored credential.
    async fn find_credentials_by_email(&self, email: &str) -> Result<UserCredentials, AppError>;

    async fn update_name(&self, id: UserId, name: &str) -> Result<User, AppError>;

    async fn update_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), AppError>;
}

/// Owner-scoped task persistence.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Validates `input` and stores a new task owned by `owner`.
    async fn create(&self, input: &TaskInput, owner: UserId) -> Result<Task, AppError>;

    /// The owner's tasks, newest first. Empty when there are none.
    async fn list_by_owner(&self, owner: UserId, query: &TaskQuery) -> Result<Vec<Task>, AppError>;

    async fn get_by_owner(&self, id: i32, owner: UserId) -> Result<Task, AppError>;

    /// Replaces title, description and due date; replaces status only when given.
    async fn update(&self, id: i32, input: &TaskInput, owner: UserId) -> Result<Task, AppError>;

    async fn delete(&self, id: i32, owner: UserId) -> Result<(), AppError>;
}
