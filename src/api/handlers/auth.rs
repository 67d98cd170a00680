use super::JsonBody;
use crate::{
    auth::AuthUser,
    db::UserProfile,
    types::{AppError, LoginRequest, Result, TokenResponse},
    AppState,
};
use axum::{extract::State, Json};

/// Exchange username and password for a bearer token.
///
/// Unknown usernames and wrong passwords get the same `401` after the same
/// Argon2 work.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let username = payload.username.trim();
    if username.is_empty() {
        return Err(AppError::InvalidInput("Username is required".to_string()));
    }
    if payload.password.is_empty() {
        return Err(AppError::InvalidInput("Password is required".to_string()));
    }

    let Some(user) = state.users.find_by_username(username).await? else {
        state.credentials.verify_decoy(&payload.password);
        return Err(AppError::Unauthorized(format!(
            "unknown username {:?}",
            username
        )));
    };

    if !state.credentials.verify(&user.password, &payload.password) {
        return Err(AppError::Unauthorized(format!(
            "wrong password for {:?}",
            username
        )));
    }

    let token = state
        .tokens
        .issue_default(user.id, &user.username, user.role)?;

    tracing::info!(username = %user.username, role = %user.role, "user logged in");

    Ok(Json(TokenResponse { token }))
}

/// The account behind the current token.
pub async fn me(AuthUser(ctx): AuthUser) -> Json<UserProfile> {
    Json(ctx.user.into())
}
