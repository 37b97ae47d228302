use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{
        CallPlaced, CarLookup, CreateCarRequest, Deleted, MessageRequest, OwnerPhone, PlateOnly,
        StatusRequest,
    },
    repo_types::Car,
    services::{self, StatusChange},
};
use crate::{
    error::Result,
    extract::{AppJson, AppPath},
    state::AppState,
};

pub fn registry_routes() -> Router<AppState> {
    Router::new()
        .route("/allCars", get(list_cars))
        .route("/cars", post(create_car))
        .route("/cars/status", put(update_status))
        .route("/cars/:plate", get(get_car).delete(delete_car))
        .route("/carsUser/:user_id", get(cars_by_user))
}

pub fn owner_contact_routes() -> Router<AppState> {
    Router::new()
        .route("/userPhoneNumber/:plate", get(owner_phone))
        .route("/cars/:plate/notify", post(message_owner))
        .route("/cars/:plate/call", post(call_owner))
}

#[instrument(skip(state))]
pub async fn list_cars(State(state): State<AppState>) -> Result<Json<Vec<Car>>> {
    Ok(Json(services::list_cars(&state).await?))
}

#[instrument(skip(state))]
pub async fn get_car(
    State(state): State<AppState>,
    AppPath(plate): AppPath<String>,
) -> Result<Json<CarLookup>> {
    let lookup = match services::get_car(&state, &plate).await? {
        Some(car) => CarLookup::Found(car),
        None => CarLookup::Missing(false),
    };
    Ok(Json(lookup))
}

#[instrument(skip(state))]
pub async fn create_car(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCarRequest>,
) -> Result<(StatusCode, Json<Car>)> {
    let car = services::create_car(
        &state,
        &payload.plate_number,
        payload.user_id,
        payload.car_status,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(car)))
}

#[instrument(skip(state))]
pub async fn cars_by_user(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<Vec<PlateOnly>>> {
    let cars = services::list_cars_by_user(&state, user_id).await?;
    Ok(Json(
        cars.into_iter()
            .map(|c| PlateOnly {
                plate_number: c.plate_number,
            })
            .collect(),
    ))
}

#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    AppJson(payload): AppJson<StatusRequest>,
) -> Result<Json<StatusChange>> {
    let change = services::set_status(&state, &payload.plate_number, payload.status).await?;
    Ok(Json(change))
}

#[instrument(skip(state))]
pub async fn delete_car(
    State(state): State<AppState>,
    AppPath(plate): AppPath<String>,
) -> Result<Json<Deleted>> {
    services::delete_car(&state, &plate).await?;
    Ok(Json(Deleted {
        detail: "Car deleted successfully",
    }))
}

#[instrument(skip(state))]
pub async fn owner_phone(
    State(state): State<AppState>,
    AppPath(plate): AppPath<String>,
) -> Result<Json<OwnerPhone>> {
    let phone_number = services::owner_phone(&state, &plate).await?;
    Ok(Json(OwnerPhone { phone_number }))
}

#[instrument(skip(state, payload))]
pub async fn message_owner(
    State(state): State<AppState>,
    AppPath(plate): AppPath<String>,
    AppJson(payload): AppJson<MessageRequest>,
) -> Result<StatusCode> {
    services::message_owner(&state, &plate, &payload.message).await?;
    Ok(StatusCode::ACCEPTED)
}

#[instrument(skip(state))]
pub async fn call_owner(
    State(state): State<AppState>,
    AppPath(plate): AppPath<String>,
) -> Result<Json<CallPlaced>> {
    let call_id = services::call_owner(&state, &plate).await?;
    Ok(Json(CallPlaced { call_id }))
}
