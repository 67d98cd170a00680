use super::jwt::{Claims, TokenCodec};
use crate::db::{User, UserDirectory};
use crate::types::{AppError, ByAt, RecordId, Result};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// A request's verified identity and its live user record.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
    pub user: User,
}

impl AuthContext {
    pub fn user_id(&self) -> RecordId {
        self.claims.subject_id
    }

    pub fn is_elevated(&self) -> bool {
        self.claims.is_elevated()
    }

    /// Audit stamp for records written on behalf of this user.
    pub fn by_at(&self) -> ByAt {
        ByAt::now(self.claims.subject_id)
    }
}

/// Verified claims whose user record has not been looked up yet.
pub struct PendingContext {
    claims: Claims,
    users: Arc<dyn UserDirectory>,
    user: OnceCell<Option<User>>,
}

impl std::fmt::Debug for PendingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingContext")
            .field("claims", &self.claims)
            .field("user", &self.user.get())
            .finish_non_exhaustive()
    }
}

impl PendingContext {
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Looks the subject up on first call; later calls reuse the outcome,
    /// including "not found".
    pub async fn resolve_user(&self) -> Result<Option<&User>> {
        let user = self
            .user
            .get_or_try_init(|| async {
                self.users
                    .find_active_by_id(self.claims.subject_id)
                    .await
                    .map_err(|e| AppError::Internal(format!("User lookup failed: {}", e)))
            })
            .await?;

        Ok(user.as_ref())
    }

    /// Resolves the user and fails when the subject no longer exists.
    pub async fn into_authenticated(self) -> Result<AuthContext> {
        self.resolve_user().await?;

        match self.user.into_inner().flatten() {
            Some(user) => Ok(AuthContext {
                claims: self.claims,
                user,
            }),
            None => Err(AppError::Unauthorized(format!(
                "subject {} is missing or deleted",
                self.claims.subject_id
            ))),
        }
    }
}

/// Turns an `Authorization` header into an [`AuthContext`].
#[derive(Clone)]
pub struct ContextBuilder {
    codec: Arc<TokenCodec>,
    users: Arc<dyn UserDirectory>,
}

/// Extracts the token from `Bearer <token>`; exactly two space-separated parts.
fn bearer_token(raw_header: &str) -> Result<&str> {
    let mut parts = raw_header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::Unauthorized(
            "authorization header is not a bearer token".to_string(),
        )),
    }
}

impl ContextBuilder {
    pub fn new(codec: Arc<TokenCodec>, users: Arc<dyn UserDirectory>) -> Self {
        Self { codec, users }
    }

    /// Verifies the header and token without touching the user directory.
    pub fn build(&self, raw_header: Option<&str>) -> Result<PendingContext> {
        let raw_header = raw_header
            .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_string()))?;
        let claims = self.codec.parse(bearer_token(raw_header)?)?;

        Ok(PendingContext {
            claims,
            users: Arc::clone(&self.users),
            user: OnceCell::new(),
        })
    }

    pub async fn authenticate(&self, raw_header: Option<&str>) -> Result<AuthContext> {
        self.build(raw_header)?.into_authenticated().await
    }
}
