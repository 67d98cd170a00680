//! Idempotent start-up data.
//!
//! Seeding only fills gaps: the superadmin is created while no account exists,
//! and a kind's checklist template only while that kind has none.

use crate::{
    db::User,
    inventory::{ChecklistTemplate, DeviceKind},
    types::{ByAt, RecordId, Result, Role},
    AppState,
};
use serde::Serialize;

pub const SUPERADMIN_USERNAME: &str = "superadmin";
pub const SUPERADMIN_FULL_NAME: &str = "Super Admin";

/// What a seeding run actually wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub superadmin_created: bool,
    pub checklists_created: Vec<DeviceKind>,
}

impl SeedReport {
    pub fn is_noop(&self) -> bool {
        !self.superadmin_created && self.checklists_created.is_empty()
    }
}

/// Runs every seeder.
pub async fn run(state: &AppState) -> Result<SeedReport> {
    let report = SeedReport {
        superadmin_created: seed_superadmin(state).await?,
        checklists_created: seed_checklists(state).await?,
    };

    if report.is_noop() {
        tracing::info!("seed data already present");
    } else {
        tracing::info!(
            superadmin = report.superadmin_created,
            checklists = report.checklists_created.len(),
            "seed data written"
        );
    }

    Ok(report)
}

/// Creates the superadmin account when no live account exists.
pub async fn seed_superadmin(state: &AppState) -> Result<bool> {
    if state.users.count().await? > 0 {
        tracing::debug!("accounts present, skipping superadmin");
        return Ok(false);
    }

    let id = RecordId::new();
    let user = User {
        id,
        full_name: SUPERADMIN_FULL_NAME.to_string(),
        username: SUPERADMIN_USERNAME.to_string(),
        password: state
            .credentials
            .hash(&state.config.seed.superadmin_password)?,
        role: Role::SuperAdmin,
        inserted: ByAt::now(id),
        updated: None,
    };
    state.users.insert(&user).await?;

    tracing::info!(username = SUPERADMIN_USERNAME, "superadmin seeded");
    Ok(true)
}

/// Creates default checklist templates for kinds that have none.
pub async fn seed_checklists(state: &AppState) -> Result<Vec<DeviceKind>> {
    let mut created = Vec::new();

    for kind in DeviceKind::ALL {
        if state.checklists.find(kind).await?.is_some() {
            continue;
        }
        state.checklists.insert(&ChecklistTemplate::default_for(kind)).await?;
        created.push(kind);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CredentialVerifier, WorkFactor};
    use crate::db::MemoryStore;
    use crate::utils::config::Config;
    use std::sync::Arc;

    fn state() -> AppState {
        let config = Config::from_lookup(|name| match name {
            "AUTH_JWT_KEY" => Some("seed-test-key".to_string()),
            "SEED_SUPERADMIN_PASSWORD" => Some("s3cret".to_string()),
            _ => None,
        })
        .unwrap();
        AppState::new(config, Arc::new(MemoryStore::new()))
            .with_credential_verifier(CredentialVerifier::with_work_factor(WorkFactor::MINIMAL))
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let state = state();

        let first = run(&state).await.unwrap();
        assert!(first.superadmin_created);
        assert_eq!(first.checklists_created.len(), DeviceKind::ALL.len());

        let second = run(&state).await.unwrap();
        assert!(second.is_noop());
        assert_eq!(state.users.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_superadmin_uses_configured_password() {
        let state = state();
        run(&state).await.unwrap();

        let user = state
            .users
            .find_by_username(SUPERADMIN_USERNAME)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, Role::SuperAdmin);
        assert_eq!(user.inserted.id, Some(user.id));
        assert!(state.credentials.verify(&user.password, "s3cret"));
        assert!(!state.credentials.verify(&user.password, "superadmin"));
    }

    #[tokio::test]
    async fn test_existing_checklist_is_kept() {
        let state = state();
        let custom = ChecklistTemplate::new(DeviceKind::Cctv, vec!["Lensa bersih".to_string()]);
        state.checklists.insert(&custom).await.unwrap();

        let created = seed_checklists(&state).await.unwrap();
        assert!(!created.contains(&DeviceKind::Cctv));
        assert_eq!(created.len(), DeviceKind::ALL.len() - 1);

        let kept = state
            .checklists
            .find(DeviceKind::Cctv)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.checkpoint, vec!["Lensa bersih".to_string()]);
    }
}
