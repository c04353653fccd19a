pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskQuery, DEFAULT_TASK_STATUS};
pub use user::{ProfileUpdate, User, UserCredentials, UserId};
