use crate::types::{AppError, RecordId, Result, Role};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// The only signing algorithm the codec issues or accepts.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Verified identity carried by a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub subject_id: RecordId,
    pub username: String,
    pub role: Role,
    pub expires_at_millis: i64,
}

impl Claims {
    pub fn is_elevated(&self) -> bool {
        self.role.is_elevated()
    }
}

/// Token payload as it appears on the wire.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    id: String,
    username: String,
    role: Role,
    #[serde(rename = "expiredDateInMilis")]
    expired_date_in_milis: i64,
}

/// Why a token was refused. Only ever logged; callers see `Unauthorized`.
#[derive(Debug, thiserror::Error)]
enum TokenRejection {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("signature mismatch")]
    BadSignature,
    #[error("unexpected signing algorithm")]
    Algorithm,
    #[error("token expired at {0}")]
    Expired(i64),
    #[error("subject id is not a record id")]
    InvalidSubject,
}

impl From<TokenRejection> for AppError {
    fn from(rejection: TokenRejection) -> Self {
        AppError::Unauthorized(rejection.to_string())
    }
}

/// Issues and parses HS256-signed identity tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_days: i64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_days", &self.ttl_days)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec over a shared secret.
    ///
    /// # Arguments
    /// * `secret` - HMAC key; rotating it invalidates every outstanding token
    /// * `ttl_days` - Default token lifetime used by [`TokenCodec::issue_default`]
    pub fn new(secret: &[u8], ttl_days: i64) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry lives in `expiredDateInMilis`, checked in `parse_at`.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_days,
        }
    }

    pub fn ttl_days(&self) -> i64 {
        self.ttl_days
    }

    /// Issues a token valid for `ttl_days` from now.
    pub fn issue(
        &self,
        subject_id: RecordId,
        username: &str,
        role: Role,
        ttl_days: i64,
    ) -> Result<String> {
        self.issue_at(subject_id, username, role, ttl_days, Utc::now())
    }

    /// Issues a token with the configured lifetime.
    pub fn issue_default(&self, subject_id: RecordId, username: &str, role: Role) -> Result<String> {
        self.issue(subject_id, username, role, self.ttl_days)
    }

    pub fn issue_at(
        &self,
        subject_id: RecordId,
        username: &str,
        role: Role,
        ttl_days: i64,
        now: DateTime<Utc>,
    ) -> Result<String> {
        let expires_at = TimeDelta::try_days(ttl_days)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AppError::Internal(format!("Invalid token lifetime: {} days", ttl_days)))?;

        let claims = WireClaims {
            id: subject_id.to_string(),
            username: username.to_string(),
            role,
            expired_date_in_milis: expires_at.timestamp_millis(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verifies a token and returns its claims.
    ///
    /// Every failure is reported as the same `Unauthorized` error.
    pub fn parse(&self, token: &str) -> Result<Claims> {
        self.parse_at(token, Utc::now())
    }

    pub fn parse_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims> {
        let wire = decode::<WireClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                ErrorKind::InvalidAlgorithm => TokenRejection::Algorithm,
                _ => TokenRejection::Malformed(e.to_string()),
            })?;

        if wire.expired_date_in_milis <= now.timestamp_millis() {
            return Err(TokenRejection::Expired(wire.expired_date_in_milis).into());
        }

        let subject_id = wire
            .id
            .parse::<RecordId>()
            .map_err(|_| TokenRejection::InvalidSubject)?;

        Ok(Claims {
            subject_id,
            username: wire.username,
            role: wire.role,
            expires_at_millis: wire.expired_date_in_milis,
        })
    }
}
