//! Derivation inputs: cost parameters, salt and passphrase.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::result::KEY_LENGTH;
use crate::error::{Result, StretchError};

/// Minimum salt length in bytes.
pub const MIN_SALT_LENGTH: usize = 16;

/// Argon2id cost parameters plus the number of stretching rounds.
///
/// Defaults:
/// - Memory: 64 MB (64 * 1024 KB)
/// - Iterations: 3
/// - Lanes: 1
/// - Rounds: 8 (progress and cancellation granularity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub lanes: u32,
    pub rounds: u32,
}

impl Default for KdfCost {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024,
            iterations: 3,
            lanes: 1,
            rounds: 8,
        }
    }
}

impl KdfCost {
    /// Check the cost against what Argon2 accepts.
    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(StretchError::InvalidInput(
                "Rounds must be at least 1".to_string(),
            ));
        }
        self.argon2_params().map(|_| ())
    }

    /// Argon2 parameters for a single stretching round.
    pub fn argon2_params(&self) -> Result<argon2::Params> {
        argon2::Params::new(
            self.memory_kib,
            self.iterations,
            self.lanes,
            Some(KEY_LENGTH),
        )
        .map_err(|e| StretchError::Crypto(format!("Invalid Argon2 parameters: {}", e)))
    }
}

/// Everything a derivation needs, plus the live progress readout and the
/// cancellation flag shared between the controller and the worker.
///
/// Both shared cells are monotonic: progress never moves backwards and a
/// cancellation request is never withdrawn.
pub struct KdfParameters {
    passphrase: SecretString,
    salt: Vec<u8>,
    cost: KdfCost,
    /// `f64` bit pattern of the progress fraction.
    progress: AtomicU64,
    cancelled: AtomicBool,
}

impl KdfParameters {
    /// Validate and bundle derivation inputs.
    ///
    /// # Errors
    ///
    /// Returns `StretchError::InvalidInput` for an empty passphrase or a salt
    /// shorter than [`MIN_SALT_LENGTH`], and `StretchError::Crypto` for a cost
    /// Argon2 rejects.
    pub fn new(passphrase: impl Into<String>, salt: &[u8], cost: KdfCost) -> Result<Self> {
        let passphrase = SecretString::from(passphrase.into());
        if passphrase.expose_secret().trim().is_empty() {
            return Err(StretchError::InvalidInput(
                "Passphrase cannot be empty".to_string(),
            ));
        }
        if salt.len() < MIN_SALT_LENGTH {
            return Err(StretchError::InvalidInput(format!(
                "Salt must be at least {} bytes (got {})",
                MIN_SALT_LENGTH,
                salt.len()
            )));
        }
        cost.validate()?;

        Ok(Self {
            passphrase,
            salt: salt.to_vec(),
            cost,
            progress: AtomicU64::new(0f64.to_bits()),
            cancelled: AtomicBool::new(false),
        })
    }

    pub fn passphrase_bytes(&self) -> &[u8] {
        self.passphrase.expose_secret().as_bytes()
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn cost(&self) -> KdfCost {
        self.cost
    }

    /// Fraction of the derivation completed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        f64::from_bits(self.progress.load(Ordering::Acquire))
    }

    /// Publish progress. Values are clamped to `[0, 1]`; a value below the
    /// current progress is ignored.
    pub fn set_progress(&self, fraction: f64) {
        if fraction.is_nan() {
            return;
        }
        // +0.0 and -0.0 compare equal but -0.0 has the sign bit set.
        let clamped = fraction.clamp(0.0, 1.0) + 0.0;
        // Non-negative f64 bit patterns order the same way as the values.
        self.progress
            .fetch_max(clamped.to_bits(), Ordering::AcqRel);
    }

    /// Ask the running derivation to stop at its next safe point.
    pub fn request_cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for KdfParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KdfParameters")
            .field("passphrase", &"[REDACTED]")
            .field("salt_len", &self.salt.len())
            .field("cost", &self.cost)
            .field("progress", &self.progress())
            .field("cancelled", &self.is_cancel_requested())
            .finish()
    }
}

/// Generate a fresh random salt of [`MIN_SALT_LENGTH`] bytes.
pub fn generate_salt() -> Result<[u8; MIN_SALT_LENGTH]> {
    let mut salt = [0u8; MIN_SALT_LENGTH];
    getrandom::getrandom(&mut salt)
        .map_err(|e| StretchError::Crypto(format!("Failed to generate salt: {}", e)))?;
    Ok(salt)
}
