use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, instrument};

use super::{
    dto::{SessionStatus, TokenRequest, TokenResponse},
    extractors::bearer_token,
    services,
};
use crate::{error::Result, extract::AppForm, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(issue_token))
        .route("/is_authenticated", get(is_authenticated))
}

#[instrument(skip(state, form))]
pub async fn issue_token(
    State(state): State<AppState>,
    AppForm(form): AppForm<TokenRequest>,
) -> Result<Json<TokenResponse>> {
    let access_token = services::login(&state, &form.username, &form.password).await?;
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

/// Never an error: an absent or rejected token answers `false`.
#[instrument(skip(state, headers))]
pub async fn is_authenticated(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<SessionStatus> {
    let Some(token) = bearer_token(&headers) else {
        return Json(SessionStatus::Invalid(false));
    };
    match state.jwt.validate(token) {
        Ok(claims) => Json(SessionStatus::Valid(claims)),
        Err(e) => {
            debug!(reason = %e, "is_authenticated rejected token");
            Json(SessionStatus::Invalid(false))
        }
    }
}
