use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use crate::error::AppError;
use crate::models::{Task, TaskInput, TaskQuery, User, UserCredentials, UserId};

use super::{duplicate_email, task_not_found, user_not_found, TaskStore, UserRepository};

/// In-process backend for both stores.
///
/// All state sits behind one mutex and every operation runs inside a single
/// lock scope, so an id lookup and its owner check can never be split.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, StoredUser>,
    tasks: BTreeMap<i32, Task>,
    last_user_id: UserId,
    last_task_id: i32,
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

impl State {
    fn user_by_email(&self, email: &str) -> Option<&StoredUser> {
        self.users.values().find(|stored| stored.user.email == email)
    }

    fn owned_task_mut(&mut self, id: i32, owner: UserId) -> Option<&mut Task> {
        self.tasks.get_mut(&id).filter(|task| task.user_id == owner)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::InternalServerError("Memory store lock poisoned".into()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, email: &str, name: &str, password_hash: &str) -> Result<User, AppError> {
        let mut state = self.lock()?;
        if state.user_by_email(email).is_some() {
            return Err(duplicate_email());
        }

        state.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: state.last_user_id,
            email: email.to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, AppError> {
        let state = self.lock()?;
        state
            .users
            .get(&id)
            .map(|stored| stored.user.clone())
            .ok_or_else(user_not_found)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        let state = self.lock()?;
        state
            .user_by_email(email)
            .map(|stored| stored.user.clone())
            .ok_or_else(user_not_found)
    }

    async fn find_credentials_by_email(&self, email: &str) -> Result<UserCredentials, AppError> {
        let state = self.lock()?;
        state
            .user_by_email(email)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            })
            .ok_or_else(user_not_found)
    }

    async fn update_name(&self, id: UserId, name: &str) -> Result<User, AppError> {
        let mut state = self.lock()?;
        let stored = state.users.get_mut(&id).ok_or_else(user_not_found)?;
        stored.user.name = name.to_string();
        stored.user.updated_at = Utc::now();
        Ok(stored.user.clone())
    }

    async fn update_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), AppError> {
        let mut state = self.lock()?;
        let stored = state.users.get_mut(&id).ok_or_else(user_not_found)?;
        stored.password_hash = password_hash.to_string();
        stored.user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create(&self, input: &TaskInput, owner: UserId) -> Result<Task, AppError> {
        input.validate()?;

        let mut state = self.lock()?;
        state.last_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: state.last_task_id,
            title: input.title.clone(),
            description: input.description.clone(),
            status: input.status_or_default(),
            due_date: input.due_date,
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn list_by_owner(&self, owner: UserId, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        let state = self.lock()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.user_id == owner && query.matches(task))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }

    async fn get_by_owner(&self, id: i32, owner: UserId) -> Result<Task, AppError> {
        let state = self.lock()?;
        state
            .tasks
            .get(&id)
            .filter(|task| task.user_id == owner)
            .cloned()
            .ok_or_else(task_not_found)
    }

    async fn update(&self, id: i32, input: &TaskInput, owner: UserId) -> Result<Task, AppError> {
        input.validate()?;

        let mut state = self.lock()?;
        let task = state.owned_task_mut(id, owner).ok_or_else(task_not_found)?;
        task.title = input.title.clone();
        task.description = input.description.clone();
        if let Some(status) = &input.status {
            task.status = status.clone();
        }
        task.due_date = input.due_date;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn delete(&self, id: i32, owner: UserId) -> Result<(), AppError> {
        let mut state = self.lock()?;
        if state.owned_task_mut(id, owner).is_none() {
            return Err(task_not_found());
        }
        state.tasks.remove(&id);
        Ok(())
    }
}
