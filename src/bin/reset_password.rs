//! Offline administration: replace a user's password.
//!
//! Usage: `reset-password <EMAIL> <NEW_PASSWORD>`. Reads the same environment
//! (and `.env`) as the server to find the database.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tasknest::{auth::PasswordHasher, config::Config, store::CredentialStore, store::PgStore, AppError};

#[derive(Debug, Parser)]
#[command(name = "reset-password", about = "Set a new password for an existing user")]
struct Args {
    /// Email of the account, matched exactly.
    email: String,
    /// The new password; stored as a bcrypt hash.
    new_password: String,
}

#[actix_web::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.new_password.is_empty() {
        log::error!("The new password must not be empty");
        return ExitCode::FAILURE;
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match reset(&config, &args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::NotFound(_)) => {
            log::error!("No user found with email {}", args.email);
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("Password reset failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn reset(config: &Config, args: &Args) -> Result<(), AppError> {
    let store = PgStore::connect(config).await?;
    let credentials = CredentialStore::new(Arc::new(store), PasswordHasher::new(config.bcrypt_cost));
    let user = credentials
        .reset_password(&args.email, &args.new_password)
        .await?;
    log::info!("Password updated for user {} ({})", user.id, user.email);
    Ok(())
}
