//! The unit-of-work seam between the controller and a key derivation function.

use thiserror::Error;

use super::params::KdfParameters;
use super::result::EncryptionParameters;

/// The two ways a derivation may end without a result that the controller
/// recovers from.
///
/// Anything else going wrong inside a work unit is a bug in that unit and must
/// panic; the worker re-raises the panic on the controller's thread.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkError {
    /// The work observed [`KdfParameters::is_cancel_requested`] and stopped.
    #[error("derivation cancelled")]
    Cancelled,

    /// Memory (or another resource) needed by the derivation was unavailable.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
}

/// A long-running, cooperatively cancellable key derivation.
///
/// Implementations must:
/// - poll [`KdfParameters::is_cancel_requested`] often enough that
///   cancellation is observed in bounded time, returning
///   [`WorkError::Cancelled`] when it is;
/// - report progress via [`KdfParameters::set_progress`] as it advances.
pub trait CancellableWork: Send + Sync {
    /// Run the derivation described by `params` to completion.
    fn generate(&self, params: &KdfParameters) -> Result<EncryptionParameters, WorkError>;
}

impl<F> CancellableWork for F
where
    F: Fn(&KdfParameters) -> Result<EncryptionParameters, WorkError> + Send + Sync,
{
    fn generate(&self, params: &KdfParameters) -> Result<EncryptionParameters, WorkError> {
        self(params)
    }
}
