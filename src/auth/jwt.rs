use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{db::AppState, error::ApiError};

const TOKEN_TTL_DAYS: i64 = 7;

/// Identity claims carried by every token, regardless of which endpoint
/// issued it. A valid token asserts "this is user X" and nothing more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt.secret)
    }
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn sign(&self, user_id: i64, username: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + Duration::days(TOKEN_TTL_DAYS);
        let claims = Claims {
            user_id,
            username: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Signature and expiry are checked together; callers only learn that
    /// the token is invalid, not which check failed.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        debug!(user_id = data.claims.user_id, "jwt verified");
        Ok(data.claims)
    }
}

/// Extracts and validates the bearer token on protected routes.
pub struct AuthUser(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized("Access denied. No token provided."))?;

        match JwtKeys::from_ref(state).verify(token) {
            Ok(claims) => Ok(AuthUser(claims.user_id)),
            Err(_) => {
                warn!("invalid or expired token");
                Err(ApiError::InvalidToken)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = JwtKeys::new("dev-secret");
        let token = keys.sign(42, "john_chef").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.username, "john_chef");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = JwtKeys::new("secret-a").sign(1, "maria_cook").expect("sign");
        assert!(JwtKeys::new("secret-b").verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let keys = JwtKeys::new("dev-secret");
        let mut token = keys.sign(1, "alex_baker").expect("sign");
        token.push('x');
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = JwtKeys::new("dev-secret");
        let past = OffsetDateTime::now_utc() - Duration::hours(2);
        let claims = Claims {
            user_id: 1,
            username: "john_chef".into(),
            iat: (past - Duration::days(7)).unix_timestamp() as usize,
            exp: past.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn claim_keys_are_normalized() {
        let claims = Claims {
            user_id: 7,
            username: "maria_cook".into(),
            iat: 0,
            exp: 1,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("username").is_some());
        assert!(json.get("user_id").is_none());
    }
}
