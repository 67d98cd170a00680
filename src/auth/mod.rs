//! Authentication and role-based authorization
//!
//! This module turns an inbound request into a verified, role-scoped identity.
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - Argon2id password hashing and verification
//! - [`auth::jwt`](crate::auth::jwt) - HS256 token issuing and parsing
//! - [`auth::context`](crate::auth::context) - Bearer header to resolved [`AuthContext`]
//! - [`auth::guard`](crate::auth::guard) - Role guards and the superadmin extractor
//! - [`auth::middleware`](crate::auth::middleware) - Axum middleware and the `AuthUser` extractor
//!
//! # Request Flow
//!
//! 1. `auth_middleware` reads `Authorization: Bearer <token>`
//! 2. The token codec verifies the signature and expiry
//! 3. The user directory is queried once for the token's subject; a deleted
//!    user makes every outstanding token invalid
//! 4. Handlers receive the context through [`AuthUser`] or [`Elevated`]
//!
//! ```ignore
//! use sipamit::auth::{AuthUser, Elevated};
//!
//! async fn me(AuthUser(ctx): AuthUser) -> String {
//!     ctx.user.full_name
//! }
//!
//! async fn list_users(Elevated(ctx): Elevated) -> String {
//!     format!("{} may list users", ctx.claims.username)
//! }
//! ```

pub mod context;
pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use context::{AuthContext, ContextBuilder, PendingContext};
pub use guard::{Elevated, RoleGuard};
pub use jwt::{Claims, TokenCodec};
pub use middleware::{auth_middleware, AuthUser};
pub use password::{CredentialVerifier, WorkFactor};
