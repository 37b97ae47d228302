use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateUserRequest, Deleted, PublicUser, UpdateUserRequest},
    repo_types::ProfileUpdate,
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, Result},
    extract::{AppJson, AppPath},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/allUsers", get(list_users))
        .route("/users/:user_id", get(get_user).delete(delete_user))
        .route("/update", patch(update_user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>)> {
    let user = services::create_user(&state, &payload.email, &payload.password).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>> {
    let users = services::list_users(&state).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<PublicUser>> {
    let user = services::get_user(&state, user_id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, caller))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<Deleted>> {
    if caller.user_id != user_id {
        warn!(caller = %caller.user_id, %user_id, "delete of another user refused");
        return Err(AppError::AuthenticationFailure);
    }
    services::delete_user(&state, user_id).await?;
    Ok(Json(Deleted {
        detail: "User deleted successfully",
    }))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<PublicUser>> {
    if caller.user_id != payload.user_id {
        warn!(caller = %caller.user_id, "update of another user refused");
        return Err(AppError::AuthenticationFailure);
    }
    let update = ProfileUpdate {
        pin_number: payload.pin_number,
        phone_number: payload.phone_number,
    };
    let user = services::update_user(&state, payload.user_id, update).await?;
    Ok(Json(user.into()))
}
