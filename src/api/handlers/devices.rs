//! Device CRUD handlers.
//!
//! One set of handlers serves every [`DeviceKind`]; the router attaches the
//! kind to each route group as an [`Extension`].

use super::{message, parse_id, JsonBody};
use crate::{
    auth::AuthUser,
    db::{Collection, Filter},
    inventory::{Device, DeviceForm, DeviceKind},
    query::{ListQuery, Paginated, SearchTarget},
    types::{AppError, Result},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Serialize;
use std::collections::HashMap;

pub(crate) fn devices(state: &AppState, kind: DeviceKind) -> Collection<Device> {
    Collection::new(state.store.clone(), kind.collection())
}

fn not_found(kind: DeviceKind) -> AppError {
    AppError::NotFound(format!("{} not found", kind.label()))
}

pub async fn list_devices(
    State(state): State<AppState>,
    Extension(kind): Extension<DeviceKind>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Paginated<Device>>> {
    let query = ListQuery::normalize(&params);
    let page = devices(&state, kind)
        .list(&query, SearchTarget::named(kind.name_field()))
        .await?;

    Ok(Json(page))
}

pub async fn get_device(
    State(state): State<AppState>,
    Extension(kind): Extension<DeviceKind>,
    Path(id): Path<String>,
) -> Result<Json<Device>> {
    let id = parse_id(&id)?;
    devices(&state, kind)
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(kind))
}

pub async fn create_device(
    State(state): State<AppState>,
    Extension(kind): Extension<DeviceKind>,
    AuthUser(ctx): AuthUser,
    JsonBody(form): JsonBody<DeviceForm>,
) -> Result<Json<Device>> {
    let device = Device::create(kind, &form, ctx.by_at())?;
    devices(&state, kind).insert(&device).await?;

    tracing::info!(kind = %kind, id = %device.id, by = %ctx.claims.username, "device created");

    Ok(Json(device))
}

pub async fn update_device(
    State(state): State<AppState>,
    Extension(kind): Extension<DeviceKind>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<String>,
    JsonBody(form): JsonBody<DeviceForm>,
) -> Result<Json<Device>> {
    let id = parse_id(&id)?;
    let collection = devices(&state, kind);

    let mut device = collection.get(id).await?.ok_or_else(|| not_found(kind))?;
    device.apply_update(kind, &form, ctx.by_at())?;

    if !collection.update(&device).await? {
        return Err(not_found(kind));
    }

    Ok(Json(device))
}

pub async fn delete_device(
    State(state): State<AppState>,
    Extension(kind): Extension<DeviceKind>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_id(&id)?;

    if !devices(&state, kind).soft_delete(id).await? {
        return Err(not_found(kind));
    }

    Ok(message(format!("{} deleted", kind.label())))
}

#[derive(Debug, Serialize)]
pub struct DeviceCount {
    pub total: u64,
}

/// Live devices of one kind (`?device=`), or of every kind.
pub async fn device_count(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DeviceCount>> {
    let query = ListQuery::normalize(&params);
    let kinds: Vec<DeviceKind> = match query.device {
        Some(kind) => vec![kind],
        None => DeviceKind::ALL.to_vec(),
    };

    let mut total = 0;
    for kind in kinds {
        total += devices(&state, kind).count(&Filter::new()).await?;
    }

    Ok(Json(DeviceCount { total }))
}
