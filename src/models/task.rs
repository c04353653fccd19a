use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::user::UserId;

/// Status given to tasks created without one.
pub const DEFAULT_TASK_STATUS: &str = "pending";

/// Input structure for creating or updating a task.
/// Contains validation rules for its fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task.
    /// Must be between 1 and 200 characters and not only whitespace.
    #[validate(length(min = 1, max = 200), custom = "validate_not_blank")]
    pub title: String,

    /// An optional description for the task.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Free-form status. Defaults to `pending` on creation; kept as-is on update when omitted.
    #[validate(length(min = 1, max = 50))]
    pub status: Option<String>,

    /// Optional due date for the task.
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskInput {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Status to store on creation.
    pub fn status_or_default(&self) -> String {
        self.status
            .clone()
            .unwrap_or_else(|| DEFAULT_TASK_STATUS.to_string())
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub due_date: Option<DateTime<Utc>>,
    /// Owner of the task. Never changes after creation.
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional filters when listing an owner's tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Exact status match.
    pub status: Option<String>,
    /// Case-insensitive substring of the title or description.
    pub search: Option<String>,
}

impl TaskQuery {
    /// Whether `task` passes every filter set on this query.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = &self.status {
            if &task.status != status {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_title = task.title.to_lowercase().contains(&needle);
            let in_description = task
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}
