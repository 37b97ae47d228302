use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
}

/// Request body for a profile update; omitted fields are left as they are.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub pin_number: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub user_id: Uuid,
    pub email: String,
    pub pin_number: Option<String>,
    pub phone_number: Option<String>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            user_id: u.user_id,
            email: u.email,
            pin_number: u.pin_number,
            phone_number: u.phone_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub detail: &'static str,
}
