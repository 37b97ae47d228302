use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::claims::SessionClaims;
use crate::{
    error::{AppError, Result},
    state::AppState,
    users::{repo_types::User, services::authenticate},
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trimmed, lower-cased and checked for a plausible shape.
pub(crate) fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("invalid email"));
    }
    Ok(email)
}

pub(crate) fn session_for(user: &User) -> SessionClaims {
    SessionClaims {
        email: user.email.clone(),
        user_id: user.user_id,
        pin_number: user.pin_number.clone(),
        phone_number: user.phone_number.clone(),
    }
}

/// Exchange credentials for a signed session token.
pub async fn login(st: &AppState, email: &str, password: &str) -> Result<String> {
    let user = authenticate(st, email, password)
        .await?
        .ok_or(AppError::AuthenticationFailure)?;
    let token = st.jwt.issue(&session_for(&user))?;
    info!(user_id = %user.user_id, "user logged in");
    Ok(token)
}
