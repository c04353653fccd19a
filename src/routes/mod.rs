pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::state::AppState;

/// Registers the application state and every route.
///
/// `/health`, `/api/register` and `/api/login` are public; the user and task
/// scopes sit behind `AuthMiddleware`.
pub fn configure(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let tokens = state.tokens.clone();
        cfg.app_data(web::Data::new(state))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(format!("Invalid request format: {}", err)).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::BadRequest(format!("Invalid query: {}", err)).into()
            }))
            .app_data(
                web::PathConfig::default()
                    .error_handler(|_err, _req| AppError::BadRequest("Invalid task ID".into()).into()),
            )
            .service(health::health)
            .service(
                web::scope("/api")
                    .service(auth::register)
                    .service(auth::login)
                    .service(
                        web::scope("/users")
                            .wrap(AuthMiddleware::new(tokens.clone()))
                            .service(users::get_profile)
                            .service(users::update_profile),
                    )
                    .service(
                        web::scope("/tasks")
                            .wrap(AuthMiddleware::new(tokens))
                            .service(tasks::get_tasks)
                            .service(tasks::create_task)
                            .service(tasks::get_task)
                            .service(tasks::update_task)
                            .service(tasks::delete_task),
                    ),
            );
    }
}
