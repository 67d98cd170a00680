use super::JsonBody;
use crate::{
    auth::AuthUser,
    inventory::{ChecklistForm, ChecklistTemplate, DeviceKind},
    types::{AppError, Result},
    AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};

fn kind_from_segment(segment: &str) -> Result<DeviceKind> {
    segment
        .parse()
        .map_err(|_| AppError::NotFound(format!("Unknown device {:?}", segment)))
}

pub async fn get_checklist(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Json<ChecklistTemplate>> {
    let kind = kind_from_segment(&segment)?;

    state
        .checklists
        .find(kind)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("{} checkpoint not found", kind.label())))
}

/// Replace a kind's checklist, creating it when the kind has none yet.
pub async fn update_checklist(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(segment): Path<String>,
    JsonBody(form): JsonBody<ChecklistForm>,
) -> Result<Json<ChecklistTemplate>> {
    let kind = kind_from_segment(&segment)?;
    let items = form.into_items()?;
    let checklists = &state.checklists;

    let template = match checklists.find(kind).await? {
        Some(mut template) => {
            template.checkpoint = items;
            template.updated = Some(ctx.by_at());
            checklists.update(&template).await?;
            template
        }
        None => {
            let mut template = ChecklistTemplate::new(kind, items);
            template.updated = Some(ctx.by_at());
            checklists.insert(&template).await?;
            template
        }
    };

    tracing::info!(kind = %kind, items = template.checkpoint.len(), "checklist updated");

    Ok(Json(template))
}
