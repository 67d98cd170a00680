//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Authentication
//! - `POST /api/login` - Exchange credentials for a bearer token
//! - `GET /api/me` - Current account
//!
//! ## Users (superadmin, except editing yourself)
//! - `POST /api/user` - Create an admin account
//! - `GET /api/users` - Paginated account list (`q` searches `full_name`)
//! - `GET|PUT|DELETE /api/user/{username}`
//!
//! ## Devices (per kind: `cctv`, `fingerprint`, `komputer-ph1`, `komputer-ph2`,
//! `printer`, `telepon`, `toa`, `ups`)
//! - `GET /api/{kind}s` - Paginated list (`/api/ups` for UPS units)
//! - `POST /api/{kind}` - Create
//! - `GET|PUT|DELETE /api/{kind}/{id}`
//! - `GET /api/device/count?device=` - Live device count
//!
//! ## Inspection documents
//! - `GET /api/docs?device=` - All kinds
//! - `GET /api/doc/{kind}s`, `POST /api/doc/{kind}`, `GET|PUT|DELETE /api/doc/{kind}/{id}`
//!
//! ## Checklist templates
//! - `GET|PUT /api/checkpoint/{kind}`
//!
//! ## System
//! - `GET /health` - Liveness probe
//! - `GET /api/version` - Build info, only when `APP_DEBUG` is on
//!
//! # Authentication
//!
//! Every endpoint except login, health and version requires:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! # List Parameters
//!
//! `q`, `device`, `sort` (`asc`|`desc`), `page` (default 1), `limit` (default 10).
//! Responses use the envelope `{"result", "total", "page", "pages", "limit"}`
//! with `result: null` when `page` is past the last page.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
