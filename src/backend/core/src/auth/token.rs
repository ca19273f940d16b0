//! Signed-token capability.
//!
//! `issue(claims) -> token` and `verify(token) -> claims` over JWTs.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ErrorCode, QuillError, Result};

/// JWT token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Username, for display without a user lookup
    pub username: String,

    /// Token ID
    #[serde(default = "generate_jti")]
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

fn generate_jti() -> String {
    Uuid::new_v4().to_string()
}

impl Claims {
    pub fn new(user_id: Uuid, username: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            username: username.into(),
            jti: generate_jti(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Parse the subject back into a user ID.
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| QuillError::new(ErrorCode::InvalidToken, "Token subject is not a user ID"))
    }
}

/// Issues and verifies signed tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token for a user.
    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String> {
        let claims = Claims::new(user_id, username, self.ttl);
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| QuillError::internal(format!("Token signing failed: {}", e)))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    QuillError::new(ErrorCode::TokenExpired, "The authentication token has expired")
                }
                _ => QuillError::new(ErrorCode::InvalidToken, "The provided token is invalid"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_verify_round_trip() {
        let service = TokenService::new("test-secret", 1);
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id, "writer").unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.username, "writer");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let issuer = TokenService::new("secret-a", 1);
        let verifier = TokenService::new("secret-b", 1);

        let token = issuer.issue(Uuid::new_v4(), "writer").unwrap();
        let err = verifier.verify(&token).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidToken);
    }

    #[test]
    fn rejects_expired_token() {
        let service = TokenService::new("test-secret", -1);
        let token = service.issue(Uuid::new_v4(), "writer").unwrap();
        let err = service.verify(&token).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TokenExpired);
    }

    #[test]
    fn rejects_garbage() {
        let service = TokenService::new("test-secret", 1);
        assert!(service.verify("not.a.jwt").is_err());
    }
}
