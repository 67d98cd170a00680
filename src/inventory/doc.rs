use super::{Device, DeviceKind};
use crate::db::Record;
use crate::types::{AppError, ByAt, RecordId, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One line of a filled-in inspection checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointResult {
    pub name: String,
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub keterangan: String,
}

/// Inspection record for a single device.
///
/// The device's attributes are copied at creation time, so later edits to the
/// device do not rewrite past inspections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDoc {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub device: DeviceKind,
    pub device_id: RecordId,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
    pub checkpoint: Vec<CheckpointResult>,
    pub inserted: ByAt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<ByAt>,
}

impl Record for DeviceDoc {
    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeviceDocForm {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub checkpoint: Vec<CheckpointResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDeviceDocForm {
    #[serde(default)]
    pub checkpoint: Vec<CheckpointResult>,
}

const EMPTY_FORM: &str = "Please fill provided field";

fn validated(checkpoint: Vec<CheckpointResult>) -> Result<Vec<CheckpointResult>> {
    if checkpoint.is_empty() || checkpoint.iter().any(|cp| cp.name.trim().is_empty()) {
        return Err(AppError::InvalidInput(EMPTY_FORM.to_string()));
    }
    Ok(checkpoint)
}

impl DeviceDocForm {
    /// Checks the form and returns the target device id.
    pub fn device_id(&self) -> Result<RecordId> {
        let raw = self.device_id.trim();
        if raw.is_empty() {
            return Err(AppError::InvalidInput(EMPTY_FORM.to_string()));
        }
        raw.parse()
            .map_err(|_| AppError::InvalidInput("Invalid device id".to_string()))
    }

    /// Validates the whole form before any lookup happens.
    pub fn into_parts(self) -> Result<(RecordId, Vec<CheckpointResult>)> {
        let device_id = self.device_id()?;
        Ok((device_id, validated(self.checkpoint)?))
    }
}

impl DeviceDoc {
    pub fn create(
        kind: DeviceKind,
        device: &Device,
        checkpoint: Vec<CheckpointResult>,
        inserted: ByAt,
    ) -> Result<Self> {
        Ok(Self {
            id: RecordId::new(),
            device: kind,
            device_id: device.id,
            attributes: device.attributes.clone(),
            checkpoint: validated(checkpoint)?,
            inserted,
            updated: None,
        })
    }

    /// Replaces the checklist.
    pub fn apply_update(&mut self, form: UpdateDeviceDocForm, updated: ByAt) -> Result<()> {
        self.checkpoint = validated(form.checkpoint)?;
        self.updated = Some(updated);
        Ok(())
    }

    pub fn passed(&self) -> usize {
        self.checkpoint.iter().filter(|cp| cp.ok).count()
    }
}
