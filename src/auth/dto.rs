use serde::{Deserialize, Serialize};

use super::claims::SessionClaims;

/// OAuth2 password-grant style form: `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Claims of a valid token, or `false`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SessionStatus {
    Valid(SessionClaims),
    Invalid(bool),
}
