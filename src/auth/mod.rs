pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;
use password::validate_password_bytes;

// Re-export necessary items
pub use extractors::AuthenticatedUserId;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, TokenService};

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address, matched exactly as stored.
    #[validate(length(min = 1))]
    pub email: String,
    /// User's password.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address for the new account.
    /// Must be a valid email format that fits the `users.email` column.
    #[validate(email, length(max = 255))]
    pub email: String,
    /// Password for the new account. Non-empty and at most 72 bytes.
    #[validate(length(min = 1), custom = "validate_password_bytes")]
    pub password: String,
    /// Display name for the new account.
    /// Must be between 1 and 100 characters.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Response structure after successful authentication (login or registration).
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    /// The JWT (JSON Web Token) for session authentication.
    pub token: String,
    /// The authenticated user, without credentials.
    pub user: User,
}
