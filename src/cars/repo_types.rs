use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Car record in the database. `activated_at` is set exactly when `car_status` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Car {
    #[serde(rename = "plateNumber")]
    pub plate_number: String, // upper-cased, primary key
    pub user_id: Uuid,
    pub car_status: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub activated_at: Option<OffsetDateTime>,
}

impl Car {
    pub fn new(plate_number: String, user_id: Uuid, status: bool, now: OffsetDateTime) -> Self {
        Self {
            plate_number,
            user_id,
            car_status: status,
            activated_at: activation_stamp(status, now),
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.car_status == self.activated_at.is_some()
    }
}

/// Activation timestamp for a status: `now` when active, empty otherwise.
pub fn activation_stamp(status: bool, now: OffsetDateTime) -> Option<OffsetDateTime> {
    status.then_some(now)
}

const RESERVED_PLATE: &str = "STATUS";

/// Every lookup and write goes through this, so "abc123" and "ABC123" are the same car.
pub fn normalize_plate(raw: &str) -> Result<String> {
    let plate = raw.trim().to_uppercase();
    if plate.is_empty() {
        return Err(AppError::validation("plate number is required"));
    }
    if plate.chars().count() > 16 {
        return Err(AppError::validation("plate number is too long"));
    }
    // `/cars/status` is a route of its own and would shadow this plate
    if plate == RESERVED_PLATE {
        return Err(AppError::validation("plate number is reserved"));
    }
    if !plate
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == ' ')
    {
        return Err(AppError::validation(
            "plate number may only contain letters, digits, dashes and spaces",
        ));
    }
    Ok(plate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plates_are_upper_cased_and_trimmed() {
        assert_eq!(normalize_plate("abc123").unwrap(), "ABC123");
        assert_eq!(normalize_plate("  xy-12 ab ").unwrap(), "XY-12 AB");
        assert_eq!(normalize_plate("сф1234ав").unwrap(), "СФ1234АВ");
    }

    #[test]
    fn bad_plates_are_rejected() {
        let bad = [
            "",
            "   ",
            "abc/123",
            "DROP;TABLE",
            "ABCDEFGHIJKLMNOPQ",
            "status",
            " Status ",
        ];
        for raw in bad {
            assert!(matches!(normalize_plate(raw), Err(AppError::Validation(_))), "{raw}");
        }
    }

    #[test]
    fn stamp_follows_status() {
        let now = OffsetDateTime::now_utc();
        assert_eq!(activation_stamp(true, now), Some(now));
        assert_eq!(activation_stamp(false, now), None);
        assert!(Car::new("A1".into(), Uuid::new_v4(), true, now).is_consistent());
        assert!(Car::new("A1".into(), Uuid::new_v4(), false, now).is_consistent());
    }

    #[test]
    fn serializes_with_wire_names() {
        let car = Car::new("ABC123".into(), Uuid::new_v4(), false, OffsetDateTime::now_utc());
        let json = serde_json::to_value(&car).unwrap();
        assert_eq!(json["plateNumber"], "ABC123");
        assert_eq!(json["car_status"], false);
        assert!(json["activated_at"].is_null());
    }
}
