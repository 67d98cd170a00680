use super::DeviceKind;
use crate::db::Record;
use crate::types::{AppError, ByAt, RecordId, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Raw attribute form posted by clients. Keys outside the kind's schema are ignored.
pub type DeviceForm = HashMap<String, String>;

/// A tracked device. Attributes follow the schema of its [`DeviceKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
    pub inserted: ByAt,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<ByAt>,
}

impl Record for Device {
    fn id(&self) -> RecordId {
        self.id
    }
}

const EMPTY_FORM: &str = "Please fill provided field";

/// `tipe_printer` -> `Tipe printer`
fn field_label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Trimmed, non-empty schema values of `form`.
fn schema_values(kind: DeviceKind, form: &DeviceForm) -> BTreeMap<String, String> {
    kind.fields()
        .iter()
        .filter_map(|field| {
            form.get(*field)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(|v| (field.to_string(), v.to_string()))
        })
        .collect()
}

impl Device {
    /// Builds a new device; every schema field is required.
    pub fn create(kind: DeviceKind, form: &DeviceForm, inserted: ByAt) -> Result<Self> {
        let attributes = schema_values(kind, form);
        if attributes.is_empty() {
            return Err(AppError::InvalidInput(EMPTY_FORM.to_string()));
        }

        if let Some(missing) = kind.fields().iter().find(|f| !attributes.contains_key(**f)) {
            return Err(AppError::InvalidInput(format!(
                "{} is required",
                field_label(missing)
            )));
        }

        Ok(Self {
            id: RecordId::new(),
            attributes,
            inserted,
            updated: None,
        })
    }

    /// Overwrites the attributes present in `form`; blank ones keep their value.
    pub fn apply_update(&mut self, kind: DeviceKind, form: &DeviceForm, updated: ByAt) -> Result<()> {
        let changes = schema_values(kind, form);
        if changes.is_empty() {
            return Err(AppError::InvalidInput(EMPTY_FORM.to_string()));
        }

        self.attributes.extend(changes);
        self.updated = Some(updated);
        Ok(())
    }
}
