use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use super::{claims::SessionClaims, jwt::JwtKeys};
use crate::error::{AppError, AuthError};

/// Claims of the caller's validated bearer token.
pub struct AuthUser(pub SessionClaims);

/// `Authorization: Bearer <token>`, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<JwtKeys>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            warn!("missing or non-bearer Authorization header");
            return Err(AuthError::Malformed.into());
        };

        let keys = Arc::<JwtKeys>::from_ref(state);
        match keys.validate(token) {
            Ok(claims) => Ok(AuthUser(claims)),
            Err(e) => {
                warn!(reason = %e, "session token rejected");
                Err(e.into())
            }
        }
    }
}
