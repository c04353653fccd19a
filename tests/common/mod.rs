#![allow(dead_code)]

use actix_web::dev::{Service, ServiceResponse};
use actix_web::{body::MessageBody, http::StatusCode, test};
use serde_json::{json, Value};
use tasknest::AppState;

pub const TEST_SECRET: &str = "integration_test_secret";

/// State over a fresh memory backend with a cheap bcrypt cost.
pub fn memory_state() -> AppState {
    AppState::in_memory(TEST_SECRET, 4)
}

// Helper struct to hold auth details
pub struct TestUser {
    pub id: i32,
    pub token: String,
}

pub async fn call_json<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            panic!(
                "Response body is not JSON: {:?}",
                String::from_utf8_lossy(&body)
            )
        })
    };
    (status, json)
}

pub async fn register_user<S, B>(app: &S, email: &str, password: &str, name: &str) -> TestUser
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({ "email": email, "password": password, "name": name }))
        .to_request();
    let (status, body) = call_json(app, req).await;
    assert_eq!(
        status,
        StatusCode::CREATED,
        "Registration failed. Body: {}",
        body
    );

    TestUser {
        id: body["user"]["id"].as_i64().expect("user id") as i32,
        token: body["token"].as_str().expect("token").to_string(),
    }
}

pub fn bearer(user: &TestUser) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", user.token))
}
