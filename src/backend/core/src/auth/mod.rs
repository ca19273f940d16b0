//! Authentication: credential hashing, signed tokens, and request extractors.
//!
//! The acting user's identity always comes from the verified bearer token,
//! never from the request body.

pub mod password;
pub mod token;

pub use token::{Claims, TokenService};

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::api::AppState;
use crate::error::{QuillError, Result};

/// Extractor for handlers that require an authenticated user.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

/// Extractor for handlers where authentication is optional (e.g. viewing a
/// blog anonymously). A missing header yields `None`; a present but invalid
/// token is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Claims>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = QuillError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self> {
        let token = bearer_token(parts)
            .ok_or_else(|| QuillError::unauthorized("Authentication credentials are required"))?;
        let claims = state.tokens.verify(token)?;
        Ok(AuthUser(claims))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = QuillError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self> {
        match bearer_token(parts) {
            None => Ok(MaybeAuthUser(None)),
            Some(token) => Ok(MaybeAuthUser(Some(state.tokens.verify(token)?))),
        }
    }
}
