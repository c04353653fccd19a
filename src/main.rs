use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, App, HttpServer};
use tasknest::{config::Config, routes, store::PgStore, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(to_io_error)?;

    let store = PgStore::connect(&config).await.map_err(to_io_error)?;
    store.migrate().await.map_err(to_io_error)?;
    log::info!("Connected to database and applied migrations");

    let state = AppState::from_config(&config, Arc::new(store));
    let allowed_origin = config.cors_allowed_origin.clone();

    log::info!("Starting tasknest server at {}", config.server_url());
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![
                header::ORIGIN,
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::AUTHORIZATION,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .configure(routes::configure(state.clone()))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    log::info!("Server exited properly");
    Ok(())
}

fn to_io_error<E: std::fmt::Display>(error: E) -> std::io::Error {
    log::error!("Startup failed: {}", error);
    std::io::Error::new(std::io::ErrorKind::Other, error.to_string())
}
