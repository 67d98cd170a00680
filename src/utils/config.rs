//! Environment-driven configuration.
//!
//! Values come from the process environment, after `.env` (if present) has
//! been loaded with `dotenvy`.

use serde::Serialize;
use std::env;
use std::path::Path;

pub const DEFAULT_DATABASE_URL: &str = "./data/sipamit.db";
/// Longest accepted token lifetime, ten years.
pub const MAX_JWT_EXPIRE_DAYS: i64 = 3650;
pub const DEFAULT_SUPERADMIN_PASSWORD: &str = "superadmin";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required")]
    Missing(&'static str),

    #[error("Environment variable '{name}' has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to load env file {0}: {1}")]
    EnvFile(String, dotenvy::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Exposes `/api/version`
    pub debug: bool,
    /// Empty means any origin, without credentials
    pub cors_allow_origins: Vec<String>,
}

#[derive(Clone, Serialize)]
pub struct AuthConfig {
    #[serde(serialize_with = "redact")]
    pub jwt_key: String,
    pub jwt_expire_days: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_key", &"[REDACTED]")
            .field("jwt_expire_days", &self.jwt_expire_days)
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(serialize_with = "redact_opt")]
    pub auth_token: Option<String>,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Clone, Serialize)]
pub struct SeedConfig {
    #[serde(serialize_with = "redact")]
    pub superadmin_password: String,
}

impl std::fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedConfig")
            .field("superadmin_password", &"[REDACTED]")
            .finish()
    }
}

fn redact<S: serde::Serializer>(_: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("[REDACTED]")
}

fn redact_opt<S: serde::Serializer>(
    value: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(_) => serializer.serialize_str("[REDACTED]"),
        None => serializer.serialize_none(),
    }
}

impl Config {
    /// Loads `.env` from the working directory, then reads the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads a specific env file, then reads the environment. Unlike
    /// [`Config::from_env`], a missing file is an error.
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        dotenvy::from_path(path)
            .map_err(|e| ConfigError::EnvFile(path.display().to_string(), e))?;
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match var("APP_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "APP_PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => 3000,
        };

        let debug = match var("APP_DEBUG") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "APP_DEBUG",
                value: raw.clone(),
                reason: "expected true or false".to_string(),
            })?,
            None => false,
        };

        let cors_allow_origins = var("CORS_ALLOW_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty() && *origin != "*")
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let jwt_key = var("AUTH_JWT_KEY").ok_or(ConfigError::Missing("AUTH_JWT_KEY"))?;

        let jwt_expire_days = match var("AUTH_JWT_EXPIRE") {
            Some(raw) => {
                let days = raw.parse::<i64>().map_err(|e| ConfigError::Invalid {
                    name: "AUTH_JWT_EXPIRE",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                if !(1..=MAX_JWT_EXPIRE_DAYS).contains(&days) {
                    return Err(ConfigError::Invalid {
                        name: "AUTH_JWT_EXPIRE",
                        value: raw,
                        reason: format!("must be between 1 and {} days", MAX_JWT_EXPIRE_DAYS),
                    });
                }
                days
            }
            None => 1,
        };

        Ok(Config {
            server: ServerConfig {
                host: var("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
                port,
                debug,
                cors_allow_origins,
            },
            auth: AuthConfig {
                jwt_key,
                jwt_expire_days,
            },
            database: DatabaseConfig {
                url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
                auth_token: var("DATABASE_AUTH_TOKEN"),
            },
            seed: SeedConfig {
                superadmin_password: var("SEED_SUPERADMIN_PASSWORD")
                    .unwrap_or_else(|| DEFAULT_SUPERADMIN_PASSWORD.to_string()),
            },
        })
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
