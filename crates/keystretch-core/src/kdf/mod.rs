//! Key derivation inputs, outputs and the pluggable unit of work.
//!
//! The controller never looks inside a derivation. It hands a shared
//! [`KdfParameters`] to a [`CancellableWork`] implementation and reads back
//! progress through the same object while the work runs.
//!
//! ## Cancellation
//!
//! Cancellation is cooperative: [`KdfParameters::request_cancel`] raises a flag
//! that the work unit polls at its own safe points. [`Argon2Work`] polls it
//! between stretching rounds.

pub mod params;
pub mod result;
pub mod stretch;
pub mod work;

pub use params::{generate_salt, KdfCost, KdfParameters, MIN_SALT_LENGTH};
pub use result::{EncryptionParameters, KEY_LENGTH};
pub use stretch::Argon2Work;
pub use work::{CancellableWork, WorkError};
