use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Identifier of a user, as assigned by the credential store.
pub type UserId = i32;

/// A user record as seen by everything outside the credential store.
///
/// There is deliberately no password field: the stored credential only ever
/// travels inside [`UserCredentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user together with its stored password credential.
///
/// Only produced for the login-verification path. Not serializable.
#[derive(Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

// The hash is opaque but still sensitive; keep it out of debug output.
impl std::fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("user", &self.user)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Payload for updating the mutable parts of a user profile.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdate {
    /// New display name. Must be between 1 and 100 characters.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: 7,
            email: "a@x.com".to_string(),
            name: "Alice".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_user_serialization_has_no_credential() {
        let json = serde_json::to_value(sample_user()).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(json["email"], "a@x.com");
        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("password_hash"));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let credentials = UserCredentials {
            user: sample_user(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuv".to_string(),
        };

        let debug = format!("{:?}", credentials);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("$2b$04$"));
    }

    #[test]
    fn test_profile_update_validation() {
        assert!(ProfileUpdate {
            name: "Alice".to_string()
        }
        .validate()
        .is_ok());
        assert!(ProfileUpdate {
            name: "".to_string()
        }
        .validate()
        .is_err());
        assert!(ProfileUpdate {
            name: "a".repeat(101)
        }
        .validate()
        .is_err());
    }
}
