use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::{delete, get, patch, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        extractors::AdminUser,
        services::{hash_password_blocking, is_valid_email},
    },
    error::ApiError,
    state::AppState,
    users::{
        dto::{CreateUserRequest, CreatedUser, Pagination, UpdateUserRequest, UserResponse},
        repo_types::{Role, User},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/:id", patch(update_user))
        .route("/users/:id", delete(remove_user))
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 6 {
        return Err(ApiError::Validation("Password too short".into()));
    }
    Ok(())
}

/// POST /users — ADMIN only. A concurrent duplicate create is arbitrated by
/// the store's unique index and surfaces as 409.
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedUser>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let hash = hash_password_blocking(payload.password).await?;
    let role = payload.role.unwrap_or(Role::User);
    let user = User::create(&state.db, &payload.email, &payload.name, &hash, role).await?;

    info!(user_id = %user.id, created_by = %admin_id, "user created");
    Ok((StatusCode::CREATED, Json(CreatedUser { id: user.id })))
}

/// GET /users — ADMIN only, paginated, excludes the caller's own row.
/// The total count travels in the X-Total-Count header.
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Query(p): Query<Pagination>,
) -> Result<(HeaderMap, Json<Vec<UserResponse>>), ApiError> {
    let page = p.page.max(1);
    let limit = p.limit.max(1);

    let total = User::count(&state.db, admin_id).await?;
    let users = User::list(&state.db, page, limit, admin_id).await?;
    if users.is_empty() {
        return Err(ApiError::NotFound("No users found".into()));
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-total-count",
        HeaderValue::from_str(&total.to_string()).map_err(anyhow::Error::from)?,
    );

    let items = users.into_iter().map(UserResponse::from).collect();
    Ok((headers, Json(items)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(user.into()))
}

/// PATCH /users/:id — a supplied password is re-hashed before storage.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Path(id): Path<i64>,
    Json(mut payload): Json<UpdateUserRequest>,
) -> Result<Json<CreatedUser>, ApiError> {
    if let Some(email) = payload.email.as_mut() {
        *email = email.trim().to_lowercase();
        validate_email(email)?;
    }
    let hash = match payload.password.take() {
        Some(password) => {
            validate_password(&password)?;
            Some(hash_password_blocking(password).await?)
        }
        None => None,
    };

    let user = User::update(
        &state.db,
        id,
        payload.name.as_deref(),
        payload.email.as_deref(),
        hash.as_deref(),
        payload.role,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(CreatedUser { id: user.id }))
}

/// DELETE /users/:id — immediate and permanent. A still-live token for the
/// removed user keeps verifying until expiry but fails at the next refresh.
#[instrument(skip(state))]
pub async fn remove_user(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let removed = User::delete(&state.db, id).await?;
    if !removed {
        return Err(ApiError::NotFound("User not found".into()));
    }
    info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
