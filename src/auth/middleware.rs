use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;

use crate::auth::extractors::AuthenticatedUserId;
use crate::auth::token::TokenService;
use crate::error::AppError;

const BEARER_PREFIX: &str = "Bearer ";

/// Rejects requests without a valid bearer token.
///
/// Wrap only the protected scopes with it. On success the verified user id is
/// stored as [`AuthenticatedUserId`] in the request extensions; on failure a
/// 401 response is returned and the wrapped service is never called.
#[derive(Clone)]
pub struct AuthMiddleware {
    tokens: Arc<TokenService>,
}

impl AuthMiddleware {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    tokens: Arc<TokenService>,
}

impl<S> AuthMiddlewareService<S> {
    fn authenticate(&self, req: &ServiceRequest) -> Result<AuthenticatedUserId, AppError> {
        let value = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Unauthorized: Missing token".into()))?;

        let token = value
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Unauthorized: Invalid or missing token".into()))?;

        self.tokens.verify(token).map(AuthenticatedUserId)
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.authenticate(&req) {
            Ok(user_id) => {
                req.extensions_mut().insert(user_id);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
            }
            Err(err) => {
                log::debug!("Rejected request to {}: {}", req.path(), err);
                let response = req
                    .into_response(err.error_response())
                    .map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};
    use chrono::Duration;

    async fn whoami(user: AuthenticatedUserId) -> HttpResponse {
        HttpResponse::Ok().body(user.get().to_string())
    }

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new("middleware_test_secret", Duration::hours(1)))
    }

    #[actix_rt::test]
    async fn test_valid_token_reaches_handler() {
        let tokens = tokens();
        let token = tokens.issue(77).unwrap();
        let app = test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(tokens))
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "77");
    }

    #[actix_rt::test]
    async fn test_rejections_do_not_reach_handler() {
        let tokens = tokens();
        let foreign = TokenService::new("other_secret", Duration::hours(1))
            .issue(77)
            .unwrap();
        let valid = tokens.issue(77).unwrap();
        let app = test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(tokens))
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;

        let cases: Vec<(Option<String>, &str)> = vec![
            (None, "missing header"),
            (Some(format!("Token {}", valid)), "wrong scheme"),
            (Some(format!("bearer {}", valid)), "lowercase scheme"),
            (Some("Bearer ".to_string()), "empty token"),
            (Some("Bearer not.a.token".to_string()), "malformed token"),
            (Some(format!("Bearer {}", foreign)), "foreign signature"),
        ];

        for (header_value, description) in cases {
            let mut req = test::TestRequest::get().uri("/api/me");
            if let Some(value) = header_value {
                req = req.insert_header((header::AUTHORIZATION, value));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(
                resp.status(),
                StatusCode::UNAUTHORIZED,
                "case: {}",
                description
            );

            let json: serde_json::Value = test::read_body_json(resp).await;
            assert!(json["error"].is_string(), "case: {}", description);
        }
    }
}
