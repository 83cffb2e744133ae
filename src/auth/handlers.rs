use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RefreshResponse},
        extractors::CurrentUser,
        services,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", get(refresh_token))
}

/// POST /auth/login — the only public entry point; every protected call
/// presents the token minted here.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    let response = services::login(&state, &payload.email, &payload.password).await?;
    Ok(Json(response))
}

/// GET /auth/refresh-token — requires a valid bearer token, no role check.
#[instrument(skip(state))]
pub async fn refresh_token(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<RefreshResponse>, ApiError> {
    let response = services::refresh_token(&state, user_id).await?;
    Ok(Json(response))
}
