use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::{ProfileUpdate, User};
use crate::{
    auth::{
        password::{hash_password, verify_password},
        services::normalize_email,
    },
    error::{AppError, Result},
    state::AppState,
};

lazy_static! {
    static ref PIN_RE: Regex = Regex::new(r"^[0-9]{4,8}$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9]{6,15}$").unwrap();
}

pub(crate) fn is_valid_pin(pin: &str) -> bool {
    PIN_RE.is_match(pin)
}

/// Spaces and dashes are dropped before the check, so "+1 555-0100" is stored as "+15550100".
pub(crate) fn normalize_phone(phone: &str) -> Option<String> {
    let compact: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    PHONE_RE.is_match(&compact).then_some(compact)
}

/// Register a user; the password is hashed before it reaches the store.
pub async fn create_user(st: &AppState, email: &str, password: &str) -> Result<User> {
    let email = normalize_email(email)?;
    if password.is_empty() {
        return Err(AppError::validation("password must not be empty"));
    }

    if st.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::DuplicateConflict("email".into()));
    }

    let hash = hash_password(password)?;
    let user = st.users.insert(&email, &hash).await?;
    info!(user_id = %user.user_id, email = %user.email, "user registered");
    Ok(user)
}

pub async fn get_user(st: &AppState, user_id: Uuid) -> Result<User> {
    st.users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))
}

pub async fn list_users(st: &AppState) -> Result<Vec<User>> {
    st.users.list().await
}

/// Partial profile update: only supplied fields change.
pub async fn update_user(st: &AppState, user_id: Uuid, update: ProfileUpdate) -> Result<User> {
    if let Some(pin) = update.pin_number.as_deref() {
        if !is_valid_pin(pin) {
            return Err(AppError::validation("pin_number must be 4 to 8 digits"));
        }
    }
    let phone_number = match update.phone_number.as_deref() {
        Some(phone) => Some(
            normalize_phone(phone)
                .ok_or_else(|| AppError::validation("phone_number is not a valid phone number"))?,
        ),
        None => None,
    };
    let update = ProfileUpdate {
        pin_number: update.pin_number,
        phone_number,
    };

    let user = st
        .users
        .update_profile(user_id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;
    info!(user_id = %user_id, "user profile updated");
    Ok(user)
}

pub async fn delete_user(st: &AppState, user_id: Uuid) -> Result<()> {
    if !st.users.delete(user_id).await? {
        return Err(AppError::not_found("user"));
    }
    info!(user_id = %user_id, "user deleted");
    Ok(())
}

/// `Ok(None)` is a credential mismatch; `Err` is reserved for real faults.
pub async fn authenticate(st: &AppState, email: &str, password: &str) -> Result<Option<User>> {
    let email = email.trim().to_lowercase();
    let Some(user) = st.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Ok(None);
    };
    if !verify_password(password, &user.hashed_password) {
        warn!(user_id = %user.user_id, "login invalid password");
        return Ok(None);
    }
    Ok(Some(user))
}
