use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity and profile carried by a valid session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub email: String,
    pub user_id: Uuid,
    pub pin_number: Option<String>,
    pub phone_number: Option<String>,
}

/// JWT payload as signed.
#[derive(Debug, Serialize)]
pub(crate) struct TokenClaims<'a> {
    pub sub: &'a str,                   // email
    pub user_id: Uuid,
    pub pin_number: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub iat: i64,
    pub exp: i64,
}

/// JWT payload as decoded; identity claims are optional so their absence
/// can be told apart from a bad signature.
#[derive(Debug, Deserialize)]
pub(crate) struct DecodedClaims {
    pub sub: Option<String>,
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub pin_number: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}
