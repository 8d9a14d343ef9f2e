use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::{
    api::{AppJson, AppState},
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{user::normalize_email, NewUser, User},
    services::auth::{hash_password, verify_password},
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: User,
}

/// Creates an account; the configured admin email is granted admin rights
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let errors = request.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut user = User::new(request.name, &request.email, hash_password(&request.password)?);
    user.is_admin = state.admin_email.as_deref() == Some(user.email.as_str());
    state.users.insert(&user).await?;

    tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchanges credentials for a bearer token
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = state
        .users
        .find_by_email(&normalize_email(&request.email))
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&request.password, &user.password_hash) {
        tracing::info!(user_id = %user.id, "Login rejected");
        return Err(invalid());
    }

    let token = state.tokens.issue(&user)?;
    Ok(Json(TokenResponse { token, user }))
}

/// The authenticated caller's account
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<User>> {
    state
        .users
        .find_by_id(auth.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
