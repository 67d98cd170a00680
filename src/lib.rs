//! # SIPAMIT - Device Inspection Inventory Server
//!
//! Inventory and inspection-record backend for an institution's IT devices:
//! CCTV cameras, fingerprint readers, office computers, printers, phones,
//! PA speakers and UPS units. Inspectors record checklist results per device;
//! superadmins manage accounts.
//!
//! ## Overview
//!
//! The crate can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `sipamit-server` binary
//! 2. **As a library** - Build the router yourself with [`build_app`]
//!
//! ### Embedding the Router
//!
//! ```rust,ignore
//! use sipamit::{build_app, db::MemoryStore, utils::config::Config, AppState};
//! use std::sync::Arc;
//!
//! let config = Config::from_env()?;
//! let state = AppState::new(config, Arc::new(MemoryStore::new()));
//! let app = build_app(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - Bearer tokens, password hashing and request guards
//! - [`db`] - Document store abstraction (memory, SQLite, Turso)
//! - [`inventory`] - Device kinds, devices, inspection documents, checklists
//! - [`query`] - List-query normalization and pagination
//! - [`seed`] - Idempotent start-up data
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration and logging

#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Bearer tokens, password hashing and request guards.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// Document store backends.
pub mod db;
/// Device inventory domain.
pub mod inventory;
/// List-query normalization and pagination.
pub mod query;
/// Start-up data.
pub mod seed;
/// Core types (ids, roles, errors).
pub mod types;
/// Configuration and logging.
pub mod utils;

use crate::{
    auth::{ContextBuilder, CredentialVerifier, TokenCodec},
    db::{ChecklistRepository, DocumentStore, UserDirectory, UserRepository},
    utils::config::{Config, ServerConfig},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

pub use types::{AppError, Result};

/// Shared handles available to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration
    pub config: Arc<Config>,
    /// Backing document store
    pub store: Arc<dyn DocumentStore>,
    /// Account lookups and writes
    pub users: UserRepository,
    /// Checklist templates per device kind
    pub checklists: ChecklistRepository,
    /// Bearer token issue and parse
    pub tokens: Arc<TokenCodec>,
    /// Password hashing
    pub credentials: Arc<CredentialVerifier>,
    /// Builds the per-request auth context
    pub context_builder: Arc<ContextBuilder>,
}

impl AppState {
    /// Wires every service around one store.
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let users = UserRepository::new(store.clone());
        let checklists = ChecklistRepository::new(store.clone());
        let tokens = Arc::new(TokenCodec::new(
            config.auth.jwt_key.as_bytes(),
            config.auth.jwt_expire_days,
        ));
        let directory: Arc<dyn UserDirectory> = Arc::new(users.clone());
        let context_builder = Arc::new(ContextBuilder::new(tokens.clone(), directory));

        Self {
            config: Arc::new(config),
            store,
            users,
            checklists,
            tokens,
            credentials: Arc::new(CredentialVerifier::new()),
            context_builder,
        }
    }

    /// Replaces the password verifier, e.g. with a cheaper work factor in tests.
    pub fn with_credential_verifier(mut self, verifier: CredentialVerifier) -> Self {
        self.credentials = Arc::new(verifier);
        self
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT];

    if server.cors_allow_origins.is_empty() {
        // Wildcard origins cannot be combined with credentials.
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers);
    }

    let origins: Vec<HeaderValue> = server
        .cors_allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(true)
}

/// Builds the complete application router: `/health`, the `/api` tree and the
/// tower-http layers.
pub fn build_app(state: AppState) -> Router {
    let api = api::routes::create_router(&state);
    let cors = cors_layer(&state.config.server);

    Router::new()
        .route("/health", get(api::handlers::system::health))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new())
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("SAMEORIGIN"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_XSS_PROTECTION,
                    HeaderValue::from_static("1; mode=block"),
                )),
        )
        .with_state(state)
}
