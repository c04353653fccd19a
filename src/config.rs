use std::env;
use std::fmt;
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Signing secret used when `JWT_SECRET` is not set. Development only.
pub const DEV_JWT_SECRET: &str = "dev_jwt_secret_key";

const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_TOKEN_VALIDITY_HOURS: i64 = 24;
/// One year.
const MAX_TOKEN_VALIDITY_HOURS: i64 = 24 * 366;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Error raised when an environment value is present but unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid value for {}: {}", self.key, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Connection parameters used when `DATABASE_URL` is not given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

impl DatabaseParams {
    /// Connection options taken field by field, so credentials need no URL escaping.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(PgSslMode::Disable)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// From `DATABASE_URL` when set, otherwise from the `DB_*` parts.
    pub database: PgConnectOptions,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    /// `true` when `jwt_secret` is the built-in development fallback.
    pub jwt_secret_is_fallback: bool,
    pub token_validity_hours: i64,
    pub bcrypt_cost: u32,
    pub cors_allowed_origin: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database = match get("DATABASE_URL") {
            Some(url) => PgConnectOptions::from_str(&url).map_err(|e| ConfigError {
                key: "DATABASE_URL",
                message: e.to_string(),
            })?,
            None => DatabaseParams {
                host: get("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
                port: parse_or("DB_PORT", get("DB_PORT"), 5432)?,
                user: get("DB_USER").unwrap_or_else(|| "postgres".to_string()),
                password: get("DB_PASSWORD").unwrap_or_else(|| "postgres_password".to_string()),
                name: get("DB_NAME").unwrap_or_else(|| "saas_db".to_string()),
            }
            .connect_options(),
        };

        let (jwt_secret, jwt_secret_is_fallback) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None => (DEV_JWT_SECRET.to_string(), true),
        };

        let token_validity_hours = parse_or(
            "JWT_EXPIRATION_HOURS",
            get("JWT_EXPIRATION_HOURS"),
            DEFAULT_TOKEN_VALIDITY_HOURS,
        )?;
        if !(1..=MAX_TOKEN_VALIDITY_HOURS).contains(&token_validity_hours) {
            return Err(ConfigError {
                key: "JWT_EXPIRATION_HOURS",
                message: format!("must be between 1 and {}", MAX_TOKEN_VALIDITY_HOURS),
            });
        }

        let bcrypt_cost = parse_or("BCRYPT_COST", get("BCRYPT_COST"), bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError {
                key: "BCRYPT_COST",
                message: "must be between 4 and 31".into(),
            });
        }

        let port_value = get("SERVER_PORT").or_else(|| get("BACKEND_PORT"));

        Ok(Self {
            database,
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            server_port: parse_or("SERVER_PORT", port_value, DEFAULT_SERVER_PORT)?,
            server_host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            jwt_secret,
            jwt_secret_is_fallback,
            token_validity_hours,
            bcrypt_cost,
            cors_allowed_origin: get("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError {
            key,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
