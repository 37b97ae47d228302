use std::sync::Arc;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::{DecodedClaims, SessionClaims, TokenClaims};
use crate::{config::JwtConfig, error::AuthError, state::AppState};

/// Signing material derived once from configuration at startup.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    pub ttl: Duration,
}

impl FromRef<AppState> for Arc<JwtKeys> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    /// Sign a token for `identity` that expires after the configured TTL.
    pub fn issue(&self, identity: &SessionClaims) -> anyhow::Result<String> {
        self.issue_with_ttl(identity, self.ttl)
    }

    pub fn issue_with_ttl(&self, identity: &SessionClaims, ttl: Duration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = TokenClaims {
            sub: &identity.email,
            user_id: identity.user_id,
            pin_number: identity.pin_number.as_deref(),
            phone_number: identity.phone_number.as_deref(),
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(user_id = %identity.user_id, "jwt signed");
        Ok(token)
    }

    pub fn validate(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let data = decode::<DecodedClaims>(token, &self.decoding, &validation).map_err(|e| {
            let kind = match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => AuthError::Malformed,
                _ => AuthError::Invalid,
            };
            debug!(error = %e, ?kind, "jwt rejected");
            kind
        })?;

        let DecodedClaims {
            sub,
            user_id,
            pin_number,
            phone_number,
        } = data.claims;
        let (Some(email), Some(user_id)) = (sub, user_id) else {
            return Err(AuthError::Malformed);
        };
        debug!(user_id = %user_id, "jwt verified");

        Ok(SessionClaims {
            email,
            user_id,
            pin_number,
            phone_number,
        })
    }
}
