use super::context::AuthContext;
use super::guard::{context_from_parts, RoleGuard};
use crate::types::{AppError, Result};
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

/// Authenticates the request and stores the resolved [`AuthContext`] in its extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let ctx = {
        let auth_header = match req.headers().get(header::AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                AppError::Unauthorized("authorization header is not visible ASCII".to_string())
            })?),
            None => None,
        };

        state.context_builder.authenticate(auth_header).await?
    };

    tracing::debug!(user = %ctx.claims.username, role = %ctx.claims.role, "request authenticated");
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}

/// Extractor for any authenticated account.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthContext);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let ctx = context_from_parts(parts)?;
        RoleGuard::AnyRole.check(&ctx)?;
        Ok(AuthUser(ctx))
    }
}
