use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::UserId;

/// The authenticated user's ID for the current request.
///
/// Inserted into request extensions by `AuthMiddleware` once the bearer token
/// has been verified. Handlers receive a copy, so the identity attached to the
/// request cannot be altered downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUserId(pub UserId);

impl AuthenticatedUserId {
    pub fn get(self) -> UserId {
        self.0
    }
}

impl FromRequest for AuthenticatedUserId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUserId>().copied() {
            Some(user_id) => ready(Ok(user_id)),
            None => {
                // Only reachable when a protected handler is mounted outside the middleware.
                log::error!("No authenticated user on request to {}", req.path());
                let err = AppError::Unauthorized("Unauthorized: Invalid or missing token".into());
                ready(Err(err.into()))
            }
        }
    }
}
