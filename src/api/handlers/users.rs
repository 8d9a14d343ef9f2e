use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::{
    api::{AppJson, AppPath, AppState},
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{user::normalize_email, NewUser, User, UserId, UserPatch},
    services::auth::hash_password,
};

use super::MessageResponse;

fn not_found() -> AppError {
    AppError::NotFound("Cannot find user".to_string())
}

pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<User>>> {
    auth.require_admin()?;
    Ok(Json(state.users.list().await?))
}

/// Creates an account on behalf of an admin
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(request): AppJson<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    auth.require_admin()?;

    let errors = request.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let user = User::new(request.name, &request.email, hash_password(&request.password)?);
    state.users.insert(&user).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<UserId>,
) -> AppResult<Json<User>> {
    auth.require_admin()?;
    state
        .users
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<UserId>,
    AppJson(patch): AppJson<UserPatch>,
) -> AppResult<Json<User>> {
    auth.require_admin()?;

    let errors = patch.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut user = state.users.find_by_id(id).await?.ok_or_else(not_found)?;
    if let Some(name) = patch.name {
        user.name = name.trim().to_string();
    }
    if let Some(email) = patch.email {
        user.email = normalize_email(&email);
    }
    if let Some(password) = patch.password {
        user.password_hash = hash_password(&password)?;
    }
    if let Some(is_admin) = patch.is_admin {
        user.is_admin = is_admin;
    }
    user.updated_at = Utc::now();

    if !state.users.update(&user).await? {
        return Err(not_found());
    }

    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<UserId>,
) -> AppResult<Json<MessageResponse>> {
    auth.require_admin()?;

    if !state.users.delete(id).await? {
        return Err(not_found());
    }

    tracing::info!(user_id = %id, "User deleted");
    Ok(Json(MessageResponse::new("Deleted user")))
}
