use actix_web::{get, put, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

use crate::{
    auth::AuthenticatedUserId, error::AppError, models::ProfileUpdate, state::AppState,
};

/// Returns the authenticated user's profile.
///
/// `404 Not Found` if the account behind a still-valid token no longer exists.
#[get("/profile")]
pub async fn get_profile(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user = state.credentials.find_by_id(user_id.get()).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

/// Updates the authenticated user's display name. Email and password are untouched.
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<AppState>,
    user_id: AuthenticatedUserId,
    update: web::Json<ProfileUpdate>,
) -> Result<impl Responder, AppError> {
    update.validate()?;

    let user = state
        .credentials
        .update_profile(user_id.get(), &update.name)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Profile updated successfully",
        "user": user
    })))
}
