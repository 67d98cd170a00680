use super::collection::Collection;
use super::traits::{DocumentStore, Filter};
use crate::inventory::{ChecklistTemplate, DeviceKind};
use crate::types::Result;
use std::sync::Arc;

pub const CHECKLIST_COLLECTION: &str = "checkpoint";

/// Checklist templates, at most one per device kind.
#[derive(Clone)]
pub struct ChecklistRepository {
    templates: Collection<ChecklistTemplate>,
}

impl ChecklistRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            templates: Collection::new(store, CHECKLIST_COLLECTION),
        }
    }

    pub async fn find(&self, kind: DeviceKind) -> Result<Option<ChecklistTemplate>> {
        self.templates
            .find_one(&Filter::new().eq("device", kind.as_str()))
            .await
    }

    pub async fn insert(&self, template: &ChecklistTemplate) -> Result<()> {
        self.templates.insert(template).await
    }

    pub async fn update(&self, template: &ChecklistTemplate) -> Result<bool> {
        self.templates.update(template).await
    }
}
