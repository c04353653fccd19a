use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use validator::Validate;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Task, TaskInput, TaskQuery, User, UserCredentials, UserId};

use super::{duplicate_email, task_not_found, user_not_found, TaskStore, UserRepository};

const USER_COLUMNS: &str = "id, email, name, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, title, description, status, due_date, user_id, created_at, updated_at";

/// PostgreSQL backend for both stores.
///
/// Each method is one autocommit statement. Task statements always carry
/// `user_id = $n` next to the id so ownership is enforced by the database.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct CredentialRow {
    id: UserId,
    email: String,
    name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool using the configured connection options and limit.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect_with(config.database.clone())
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert(&self, email: &str, name: &str, password_hash: &str) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (email, name, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(name)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => duplicate_email(),
                other => other.into(),
            })
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(user_not_found)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(user_not_found)
    }

    async fn find_credentials_by_email(&self, email: &str) -> Result<UserCredentials, AppError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, email, name, password_hash, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(user_not_found)?;

        Ok(UserCredentials {
            user: User {
                id: row.id,
                email: row.email,
                name: row.name,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            password_hash: row.password_hash,
        })
    }

    async fn update_name(&self, id: UserId, name: &str) -> Result<User, AppError> {
        let sql = format!(
            "UPDATE users SET name = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(user_not_found)
    }

    async fn update_password_hash(&self, id: UserId, password_hash: &str) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
                .bind(password_hash)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create(&self, input: &TaskInput, owner: UserId) -> Result<Task, AppError> {
        input.validate()?;

        let sql = format!(
            "INSERT INTO tasks (title, description, status, due_date, user_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status_or_default())
            .bind(input.due_date)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    async fn list_by_owner(&self, owner: UserId, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        // Filters are appended with their own placeholders; the owner predicate is always $1.
        let mut sql = format!("SELECT {} FROM tasks WHERE user_id = $1", TASK_COLUMNS);
        let mut param_count = 2;

        if query.status.is_some() {
            sql.push_str(&format!(" AND status = ${}", param_count));
            param_count += 1;
        }
        if query.search.is_some() {
            sql.push_str(&format!(
                " AND (title ILIKE ${0} OR description ILIKE ${0})",
                param_count
            ));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(owner);
        if let Some(status) = &query.status {
            query_builder = query_builder.bind(status);
        }
        if let Some(search) = &query.search {
            query_builder = query_builder.bind(format!("%{}%", escape_like(search)));
        }

        Ok(query_builder.fetch_all(&self.pool).await?)
    }

    async fn get_by_owner(&self, id: i32, owner: UserId) -> Result<Task, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(task_not_found)
    }

    async fn update(&self, id: i32, input: &TaskInput, owner: UserId) -> Result<Task, AppError> {
        input.validate()?;

        let sql = format!(
            "UPDATE tasks \
             SET title = $1, description = $2, status = COALESCE($3, status), due_date = $4, \
                 updated_at = NOW() \
             WHERE id = $5 AND user_id = $6 \
             RETURNING {}",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.status)
            .bind(input.due_date)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(task_not_found)
    }

    async fn delete(&self, id: i32, owner: UserId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(task_not_found());
        }
        Ok(())
    }
}

/// Escapes `ILIKE` wildcards so a search term is matched literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("milk"), "milk");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
