//! Account management.
//!
//! Creating, listing, viewing and deleting accounts is reserved to superadmins.
//! Any account may edit itself; superadmins may edit anyone.

use super::JsonBody;
use crate::{
    auth::{AuthUser, Elevated},
    db::{User, UserProfile},
    query::{ListQuery, Paginated},
    types::{AppError, RecordId, Result, Role},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Default, Deserialize)]
pub struct UserForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl UserForm {
    fn is_empty(&self) -> bool {
        self.full_name.trim().is_empty()
            && self.username.trim().is_empty()
            && self.password.is_empty()
    }
}

const EMPTY_FORM: &str = "Please fill provided field";

async fn find_user(state: &AppState, username: &str) -> Result<User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::InvalidInput("Username is required".to_string()));
    }

    state
        .users
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Create a standard (admin) account.
pub async fn create_user(
    State(state): State<AppState>,
    Elevated(ctx): Elevated,
    JsonBody(form): JsonBody<UserForm>,
) -> Result<Json<UserProfile>> {
    if form.is_empty() {
        return Err(AppError::InvalidInput(EMPTY_FORM.to_string()));
    }

    let full_name = form.full_name.trim();
    let username = form.username.trim();
    if full_name.is_empty() {
        return Err(AppError::InvalidInput("Full Name is required".to_string()));
    }
    if username.is_empty() {
        return Err(AppError::InvalidInput("Username is required".to_string()));
    }
    if form.password.is_empty() {
        return Err(AppError::InvalidInput("Password is required".to_string()));
    }

    if state.users.username_taken(username).await? {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let user = User {
        id: RecordId::new(),
        full_name: full_name.to_string(),
        username: username.to_string(),
        password: state.credentials.hash(&form.password)?,
        role: Role::Admin,
        inserted: ctx.by_at(),
        updated: None,
    };
    state.users.insert(&user).await?;

    tracing::info!(username = %user.username, by = %ctx.claims.username, "user created");

    Ok(Json(user.into()))
}

pub async fn list_users(
    State(state): State<AppState>,
    Elevated(_): Elevated,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Paginated<UserProfile>>> {
    let query = ListQuery::normalize(&params);
    let page = state.users.list(&query).await?;

    Ok(Json(page.map(UserProfile::from)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Elevated(_): Elevated,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>> {
    Ok(Json(find_user(&state, &username).await?.into()))
}

/// Edit an account. Blank fields keep their current value.
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(username): Path<String>,
    JsonBody(form): JsonBody<UserForm>,
) -> Result<Json<UserProfile>> {
    if !ctx.is_elevated() && ctx.user.username != username.trim() {
        return Err(AppError::Forbidden);
    }
    if form.is_empty() {
        return Err(AppError::InvalidInput(EMPTY_FORM.to_string()));
    }

    let mut user = find_user(&state, &username).await?;

    let full_name = form.full_name.trim();
    if !full_name.is_empty() {
        user.full_name = full_name.to_string();
    }

    let new_username = form.username.trim();
    if !new_username.is_empty() && new_username != user.username {
        if state.users.username_taken(new_username).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        user.username = new_username.to_string();
    }

    if !form.password.is_empty() {
        user.password = state.credentials.hash(&form.password)?;
    }

    user.updated = Some(ctx.by_at());
    if !state.users.update(&user).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(user.into()))
}

/// Soft-delete an account. Outstanding tokens for it stop working immediately.
pub async fn delete_user(
    State(state): State<AppState>,
    Elevated(ctx): Elevated,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>> {
    let user = find_user(&state, &username).await?;

    if user.id == ctx.user_id() {
        return Err(AppError::InvalidInput(
            "Cannot delete your own account".to_string(),
        ));
    }

    if !state.users.soft_delete(user.id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(username = %user.username, by = %ctx.claims.username, "user deleted");

    Ok(Json(user.into()))
}
