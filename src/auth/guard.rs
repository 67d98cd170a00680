use super::context::AuthContext;
use crate::types::{AppError, Result};
use axum::{extract::FromRequestParts, http::request::Parts};

/// Role requirement for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleGuard {
    /// Superadmin only
    Elevated,
    /// Any authenticated account
    AnyRole,
}

impl RoleGuard {
    pub fn allows(&self, ctx: &AuthContext) -> bool {
        match self {
            RoleGuard::Elevated => ctx.is_elevated(),
            RoleGuard::AnyRole => true,
        }
    }

    pub fn check(&self, ctx: &AuthContext) -> Result<()> {
        if self.allows(ctx) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Passes only when every guard passes.
    pub fn check_all(guards: &[RoleGuard], ctx: &AuthContext) -> Result<()> {
        guards.iter().try_for_each(|guard| guard.check(ctx))
    }
}

/// Pulls the context the auth middleware stored on the request.
pub(crate) fn context_from_parts(parts: &Parts) -> Result<AuthContext> {
    parts
        .extensions
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("no authenticated context on request".to_string()))
}

/// Extractor admitting superadmins only.
#[derive(Debug, Clone)]
pub struct Elevated(pub AuthContext);

impl<S> FromRequestParts<S> for Elevated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let ctx = context_from_parts(parts)?;
        RoleGuard::Elevated.check(&ctx)?;
        Ok(Elevated(ctx))
    }
}
