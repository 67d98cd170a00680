use crate::types::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, OnceLock,
};

const DECOY_PASSWORD: &str = "sipamit-decoy";

/// Argon2id cost parameters.
///
/// The parameters are embedded in every PHC string produced by
/// [`CredentialVerifier::hash`], so hashes made under an older work factor keep
/// verifying after the constant changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkFactor {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl WorkFactor {
    /// Work factor for newly stored passwords.
    pub const V1: WorkFactor = WorkFactor {
        memory_kib: 19_456,
        iterations: 2,
        parallelism: 1,
    };

    /// Argon2's minimum cost. Only for tests and throwaway environments.
    pub const MINIMAL: WorkFactor = WorkFactor {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
}

impl Default for WorkFactor {
    fn default() -> Self {
        Self::V1
    }
}

/// Hashes and verifies account passwords with Argon2id.
///
/// Logins for unknown accounts go through [`verify_decoy`](Self::verify_decoy)
/// so they cost the same Argon2 run as a wrong password.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    work_factor: WorkFactor,
    decoy: OnceLock<String>,
    verifications: Arc<AtomicU64>,
}

impl Default for CredentialVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialVerifier {
    pub fn new() -> Self {
        Self::with_work_factor(WorkFactor::V1)
    }

    pub fn with_work_factor(work_factor: WorkFactor) -> Self {
        Self {
            work_factor,
            decoy: OnceLock::new(),
            verifications: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn work_factor(&self) -> WorkFactor {
        self.work_factor
    }

    /// Number of Argon2 verifications run so far.
    pub fn verifications(&self) -> u64 {
        self.verifications.load(Ordering::Relaxed)
    }

    fn hasher(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.work_factor.memory_kib,
            self.work_factor.iterations,
            self.work_factor.parallelism,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Invalid argon2 parameters: {}", e)))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hashes a password, returning a PHC-formatted string.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Checks `candidate` against a stored hash.
    ///
    /// A malformed stored hash counts as a mismatch.
    pub fn verify(&self, stored_hash: &str, candidate: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };

        self.verifications.fetch_add(1, Ordering::Relaxed);

        // Cost parameters come from the PHC string, not from `self`.
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }

    /// Runs a verification that always fails, against a hash made once with
    /// the current work factor.
    pub fn verify_decoy(&self, candidate: &str) {
        let decoy = self.decoy.get_or_init(|| match self.hash(DECOY_PASSWORD) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::error!(error = %e, "failed to build decoy password hash");
                String::new()
            }
        });

        // The decoy password itself must not log anyone in.
        let _ = self.verify(decoy, candidate);
    }
}
