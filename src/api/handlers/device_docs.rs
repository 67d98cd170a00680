//! Inspection document handlers.
//!
//! Documents of every kind share one collection and carry a `device` field,
//! so `/api/docs?device=` can list across kinds.

use super::devices::devices;
use super::{message, parse_id, JsonBody};
use crate::{
    auth::AuthUser,
    db::Collection,
    inventory::{DeviceDoc, DeviceDocForm, DeviceKind, UpdateDeviceDocForm},
    query::{ListQuery, Paginated, SearchTarget},
    types::{AppError, RecordId, Result},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use std::collections::HashMap;

pub const DOCS_COLLECTION: &str = "device_docs";

fn docs(state: &AppState) -> Collection<DeviceDoc> {
    Collection::new(state.store.clone(), DOCS_COLLECTION)
}

fn not_found(kind: DeviceKind) -> AppError {
    AppError::NotFound(format!("{} Doc not found", kind.label()))
}

/// Fetches a document, treating one of another kind as missing.
async fn find_doc(state: &AppState, kind: DeviceKind, id: RecordId) -> Result<DeviceDoc> {
    docs(state)
        .get(id)
        .await?
        .filter(|doc| doc.device == kind)
        .ok_or_else(|| not_found(kind))
}

/// Documents of every kind; `device` narrows to one.
pub async fn list_all_docs(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Paginated<DeviceDoc>>> {
    let query = ListQuery::normalize(&params);
    let target = SearchTarget::named("nama").with_kind_field("device");

    Ok(Json(docs(&state).list(&query, target).await?))
}

pub async fn list_docs(
    State(state): State<AppState>,
    Extension(kind): Extension<DeviceKind>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Paginated<DeviceDoc>>> {
    let query = ListQuery::normalize(&params).for_device(kind);
    let target = SearchTarget::named(kind.name_field()).with_kind_field("device");

    Ok(Json(docs(&state).list(&query, target).await?))
}

pub async fn get_doc(
    State(state): State<AppState>,
    Extension(kind): Extension<DeviceKind>,
    Path(id): Path<String>,
) -> Result<Json<DeviceDoc>> {
    let id = parse_id(&id)?;
    Ok(Json(find_doc(&state, kind, id).await?))
}

/// Record an inspection of an existing device.
pub async fn create_doc(
    State(state): State<AppState>,
    Extension(kind): Extension<DeviceKind>,
    AuthUser(ctx): AuthUser,
    JsonBody(form): JsonBody<DeviceDocForm>,
) -> Result<Json<DeviceDoc>> {
    let (device_id, checkpoint) = form.into_parts()?;

    let device = devices(&state, kind)
        .get(device_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", kind.label())))?;

    let doc = DeviceDoc::create(kind, &device, checkpoint, ctx.by_at())?;
    docs(&state).insert(&doc).await?;

    tracing::info!(
        kind = %kind,
        device = %device.id,
        passed = doc.passed(),
        total = doc.checkpoint.len(),
        "inspection recorded"
    );

    Ok(Json(doc))
}

pub async fn update_doc(
    State(state): State<AppState>,
    Extension(kind): Extension<DeviceKind>,
    AuthUser(ctx): AuthUser,
    Path(id): Path<String>,
    JsonBody(form): JsonBody<UpdateDeviceDocForm>,
) -> Result<Json<DeviceDoc>> {
    let id = parse_id(&id)?;

    let mut doc = find_doc(&state, kind, id).await?;
    doc.apply_update(form, ctx.by_at())?;

    if !docs(&state).update(&doc).await? {
        return Err(not_found(kind));
    }

    Ok(Json(doc))
}

pub async fn delete_doc(
    State(state): State<AppState>,
    Extension(kind): Extension<DeviceKind>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let id = parse_id(&id)?;

    let doc = find_doc(&state, kind, id).await?;
    if !docs(&state).soft_delete(doc.id).await? {
        return Err(not_found(kind));
    }

    Ok(message(format!("{} Doc deleted", kind.label())))
}
