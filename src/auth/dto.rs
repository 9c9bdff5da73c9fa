use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::repo::User;

/// Request body for signup. Fields stay optional so the handler can answer
/// with the full list of required fields instead of a deserialization error.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Response returned after signup or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: PublicUser,
    pub token: String,
}
