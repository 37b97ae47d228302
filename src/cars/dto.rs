use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::repo_types::Car;
use crate::notify::CallId;

#[derive(Debug, Deserialize)]
pub struct CreateCarRequest {
    #[serde(rename = "plateNumber")]
    pub plate_number: String,
    pub user_id: Uuid,
    #[serde(default, deserialize_with = "status_flag")]
    pub car_status: bool,
}

/// Any client-supplied `activated_at` is ignored; the server stamps activation time.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    #[serde(rename = "plateNumber")]
    pub plate_number: String,
    #[serde(default, deserialize_with = "status_flag")]
    pub status: bool,
}

/// Status flags arrive as `true`/`false`, `0`/`1` or `null` (treated as `false`).
fn status_flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Option::<Flag>::deserialize(de)? {
        None | Some(Flag::Bool(false)) | Some(Flag::Int(0)) => Ok(false),
        Some(Flag::Bool(true)) | Some(Flag::Int(1)) => Ok(true),
        Some(Flag::Int(n)) => Err(D::Error::custom(format!(
            "status must be a boolean, 0 or 1, got {n}"
        ))),
    }
}

/// The car, or `false` when the plate is unknown.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CarLookup {
    Found(Car),
    Missing(bool),
}

#[derive(Debug, Serialize)]
pub struct PlateOnly {
    #[serde(rename = "plateNumber")]
    pub plate_number: String,
}

#[derive(Debug, Serialize)]
pub struct OwnerPhone {
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CallPlaced {
    pub call_id: CallId,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub detail: &'static str,
}
