//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every store, the token service and the request handlers report failures through it,
//! so a single `ResponseError` implementation decides what the caller gets to see.
//!
//! Internal failures (database connectivity, signing, hashing) are rendered as a
//! generic JSON body; the full detail only goes to the log. `From` implementations
//! for `sqlx::Error`, `validator::ValidationErrors`, `jsonwebtoken::errors::Error`
//! (token signing) and `bcrypt::BcryptError` (password hashing) allow propagation
//! with the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Message returned to callers for any internal failure.
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed or expired credentials (HTTP 401).
    /// Login failures and token failures share this variant on purpose.
    Unauthorized(String),
    /// A malformed request that could not be interpreted (HTTP 400).
    BadRequest(String),
    /// The record does not exist, or exists but is owned by someone else (HTTP 404).
    NotFound(String),
    /// A uniqueness conflict, e.g. an email that is already registered (HTTP 409).
    Conflict(String),
    /// An unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// An error originating from database operations (HTTP 500).
    DatabaseError(String),
    /// Input that failed validation, e.g. an empty task title (HTTP 422).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// Internal failures are logged in full here and replaced by a generic message
/// in the response body.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ValidationError(msg) => msg.as_str(),
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                log::error!("{}", self);
                INTERNAL_ERROR_MESSAGE
            }
        };

        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`; unique violations are left to the store
/// that knows which constraint was hit, everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::DatabaseError(format!("Migration failed: {}", error))
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::InternalServerError`.
///
/// Only signing goes through here. Verification failures are mapped by the
/// token service so that every rejected token gets the same 401.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::InternalServerError(format!("Failed to generate token: {}", error))
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Failed to hash password: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Invalid token".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::BadRequest("Invalid input".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::NotFound("Resource not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::Conflict("Email already registered".into());
        assert_eq!(error.error_response().status(), 409);

        let error = AppError::ValidationError("title: empty".into());
        assert_eq!(error.error_response().status(), 422);

        let error = AppError::InternalServerError("Server error".into());
        assert_eq!(error.error_response().status(), 500);

        let error = AppError::DatabaseError("connection refused".into());
        assert_eq!(error.error_response().status(), 500);
    }

    #[actix_rt::test]
    async fn test_internal_details_are_not_exposed() {
        let error = AppError::DatabaseError("password authentication failed for user".into());
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], INTERNAL_ERROR_MESSAGE);
    }

    #[actix_rt::test]
    async fn test_client_errors_keep_their_message() {
        let error = AppError::NotFound("Task not found".into());
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["error"], "Task not found");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, AppError::NotFound(_)));

        let error: AppError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(error, AppError::DatabaseError(_)));
    }

    #[test]
    fn test_library_errors_are_internal() {
        let error: AppError = bcrypt::BcryptError::CostNotAllowed(2).into();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let error: AppError =
            jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidRsaKey(
                "bad key".into(),
            ))
            .into();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
