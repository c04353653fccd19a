use crate::{
    auth::{AuthResponse, LoginRequest, RegisterRequest},
    error::AppError,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns an authentication token.
///
/// ## Responses:
/// - `201 Created`: `AuthResponse` with the token and the new user.
/// - `400 Bad Request`: malformed JSON or missing fields.
/// - `409 Conflict`: the email is already registered.
/// - `422 Unprocessable Entity`: invalid email, empty name or password.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = state
        .credentials
        .create_user(
            &register_data.email,
            &register_data.name,
            &register_data.password,
        )
        .await?;
    let token = state.tokens.issue(user.id)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        message: "User registered successfully".into(),
        token,
        user,
    }))
}

/// Login user
///
/// Authenticates a user and returns an authentication token.
/// Unknown emails and wrong passwords both answer `401 Unauthorized`.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = state
        .credentials
        .authenticate(&login_data.email, &login_data.password)
        .await?;
    let token = state.tokens.issue(user.id)?;
    log::info!("User {} logged in", user.id);

    Ok(HttpResponse::Ok().json(AuthResponse {
        message: "Login successful".into(),
        token,
        user,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    fn state() -> AppState {
        AppState::in_memory("route_test_secret", 4)
    }

    #[actix_rt::test]
    async fn test_register_validation() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(register),
        )
        .await;

        let cases = vec![
            (
                json!({ "email": "invalid-email", "password": "pw123", "name": "Alice" }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                json!({ "email": "a@x.com", "password": "", "name": "Alice" }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                json!({ "email": "a@x.com", "password": "pw123", "name": "" }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                json!({ "email": "a@x.com", "password": "pw123" }),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (payload, expected) in cases {
            let req = test::TestRequest::post()
                .uri("/register")
                .set_json(&payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected, "payload: {}", payload);
        }
    }

    #[actix_rt::test]
    async fn test_login_validation() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .service(login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "a@x.com", "password": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "a@x.com", "password": "pw123" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
