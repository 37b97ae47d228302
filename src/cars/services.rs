use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::repo_types::{activation_stamp, normalize_plate, Car};
use crate::{
    error::{AppError, Result},
    notify::{blocking_message, call_script, CallId},
    state::AppState,
};

/// What happened to the owner notification after a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationOutcome {
    Sent,
    Failed { detail: String },
    Skipped { detail: String },
    NotRequired,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub car: Car,
    pub notification: NotificationOutcome,
}

/// Register a car for an existing user. A car created active is stamped but not announced.
pub async fn create_car(st: &AppState, plate: &str, user_id: Uuid, status: bool) -> Result<Car> {
    let plate = normalize_plate(plate)?;

    if st.users.find_by_id(user_id).await?.is_none() {
        warn!(%user_id, "car owner does not exist");
        return Err(AppError::not_found("user"));
    }
    if st.cars.find(&plate).await?.is_some() {
        warn!(plate = %plate, "plate already registered");
        return Err(AppError::DuplicateConflict("plate number".into()));
    }

    let car = st
        .cars
        .insert(&Car::new(plate, user_id, status, OffsetDateTime::now_utc()))
        .await?;
    info!(plate = %car.plate_number, %user_id, "car registered");
    Ok(car)
}

/// `Ok(None)` when no car has this plate, including plates that could never be registered.
pub async fn get_car(st: &AppState, plate: &str) -> Result<Option<Car>> {
    let Ok(plate) = normalize_plate(plate) else {
        debug!(plate, "lookup of an unregistrable plate");
        return Ok(None);
    };
    st.cars.find(&plate).await
}

pub async fn list_cars(st: &AppState) -> Result<Vec<Car>> {
    st.cars.list().await
}

/// An owner without cars is reported as `NotFound`, not as an empty list.
pub async fn list_cars_by_user(st: &AppState, user_id: Uuid) -> Result<Vec<Car>> {
    let cars = st.cars.list_by_user(user_id).await?;
    if cars.is_empty() {
        return Err(AppError::not_found("no cars found for this user"));
    }
    Ok(cars)
}

/// Activate or clear a car. The server clock is the only source of `activated_at`.
///
/// Every activation is announced to the owner. Notification is best-effort: its
/// outcome is reported alongside the stored car and never undoes the write.
pub async fn set_status(st: &AppState, plate: &str, status: bool) -> Result<StatusChange> {
    let plate = normalize_plate(plate)?;
    let activated_at = activation_stamp(status, OffsetDateTime::now_utc());

    let car = st
        .cars
        .set_status(&plate, status, activated_at)
        .await?
        .ok_or_else(|| AppError::not_found("car"))?;
    debug_assert!(car.is_consistent());
    info!(plate = %car.plate_number, status, "car status updated");

    let notification = if car.car_status {
        notify_activation(st, &car).await
    } else {
        NotificationOutcome::NotRequired
    };
    Ok(StatusChange { car, notification })
}

async fn notify_activation(st: &AppState, car: &Car) -> NotificationOutcome {
    let owner = match st.users.find_by_id(car.user_id).await {
        Ok(Some(owner)) => owner,
        Ok(None) => {
            warn!(plate = %car.plate_number, "activated car has no owner record");
            return NotificationOutcome::Skipped {
                detail: "owner not found".into(),
            };
        }
        Err(e) => {
            error!(error = %e, plate = %car.plate_number, "owner lookup failed");
            return NotificationOutcome::Failed {
                detail: "owner lookup failed".into(),
            };
        }
    };

    let Some(phone) = owner.phone_number.as_deref() else {
        warn!(user_id = %owner.user_id, "owner has no phone number; notification skipped");
        return NotificationOutcome::Skipped {
            detail: "owner has no phone number".into(),
        };
    };

    match st
        .notifier
        .notify_owner(phone, &blocking_message(&car.plate_number))
        .await
    {
        Ok(()) => {
            info!(plate = %car.plate_number, user_id = %owner.user_id, "owner notified");
            NotificationOutcome::Sent
        }
        Err(e) => {
            error!(error = %e, plate = %car.plate_number, "owner notification failed");
            NotificationOutcome::Failed {
                detail: "notification could not be delivered".into(),
            }
        }
    }
}

pub async fn delete_car(st: &AppState, plate: &str) -> Result<()> {
    let plate = normalize_plate(plate)?;
    if !st.cars.delete(&plate).await? {
        return Err(AppError::not_found("car"));
    }
    info!(plate = %plate, "car deleted");
    Ok(())
}

/// Phone number of the car's owner, used by the calling flow.
pub async fn owner_phone(st: &AppState, plate: &str) -> Result<String> {
    let car = get_car(st, plate)
        .await?
        .ok_or_else(|| AppError::not_found("car"))?;
    let owner = st
        .users
        .find_by_id(car.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;
    owner
        .phone_number
        .ok_or_else(|| AppError::not_found("phone number"))
}

/// Send a free-form message to the car's owner. Delivery failure is the caller's error here.
pub async fn message_owner(st: &AppState, plate: &str, message: &str) -> Result<()> {
    let plate = normalize_plate(plate)?;
    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::validation("message must not be empty"));
    }
    let phone = owner_phone(st, &plate).await?;
    st.notifier.notify_owner(&phone, message).await?;
    info!(plate = %plate, "owner messaged");
    Ok(())
}

pub async fn call_owner(st: &AppState, plate: &str) -> Result<CallId> {
    let plate = normalize_plate(plate)?;
    let phone = owner_phone(st, &plate).await?;
    let call_id = st.notifier.place_call(&phone, &call_script(&plate)).await?;
    info!(plate = %plate, call_id = %call_id.0, "owner call placed");
    Ok(call_id)
}
