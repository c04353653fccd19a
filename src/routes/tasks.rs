use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{TaskInput, TaskQuery},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;

/// Retrieves the authenticated user's tasks, newest first.
///
/// ## Query Parameters:
/// - `status` (optional): exact status match.
/// - `search` (optional): case-insensitive match against title and description.
///
/// ## Responses:
/// - `200 OK`: `{ "tasks": [...] }`, possibly empty.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list_by_owner(user_id.get(), &query).await?;
    Ok(HttpResponse::Ok().json(json!({ "tasks": tasks })))
}

/// Creates a new task owned by the authenticated user.
///
/// The owner always comes from the token, never from the body.
///
/// ## Responses:
/// - `201 Created`: `{ "message", "task" }`.
/// - `400 Bad Request`: malformed JSON or missing `title`.
/// - `422 Unprocessable Entity`: empty title or oversized fields.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.create(&task_data, user_id.get()).await?;
    log::debug!("User {} created task {}", task.user_id, task.id);

    Ok(HttpResponse::Created().json(json!({
        "message": "Task created successfully",
        "task": task
    })))
}

/// Retrieves one of the authenticated user's tasks.
///
/// `404 Not Found` both when the task does not exist and when it belongs to
/// another user.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .get_by_owner(task_id.into_inner(), user_id.get())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "task": task })))
}

/// Updates one of the authenticated user's tasks.
///
/// Same `404` policy as [`get_task`]; the title is validated again.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .update(task_id.into_inner(), &task_data, user_id.get())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task updated successfully",
        "task": task
    })))
}

/// Deletes one of the authenticated user's tasks.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    state
        .tasks
        .delete(task_id.into_inner(), user_id.get())
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted successfully" })))
}
