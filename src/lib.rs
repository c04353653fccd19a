#![doc = "The `tasknest` library crate."]
#![doc = ""]
#![doc = "Token authentication, password credentials, owner-scoped task storage and the"]
#![doc = "HTTP routes on top of them. The binaries (`main.rs`, `bin/reset_password.rs`)"]
#![doc = "only load configuration and wire these pieces together."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
