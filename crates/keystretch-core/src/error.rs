//! Error types for keystretch core operations.
//!
//! Only failures the caller can act on live here. Cancellation and resource
//! exhaustion inside a running derivation are job outcomes, not errors, and
//! are modelled by [`crate::kdf::WorkError`] instead.

use thiserror::Error;

/// Result type alias for keystretch operations.
pub type Result<T> = std::result::Result<T, StretchError>;

/// Core error type for keystretch operations.
#[derive(Debug, Error)]
pub enum StretchError {
    /// Invalid user input (passphrase, salt)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Cost parameters rejected by the key derivation function
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// The OS refused to spawn a thread
    #[error("Failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// A control message tag that maps to no known message
    #[error("Unknown message tag: {0}")]
    UnknownMessage(u8),

    /// The dispatch thread is no longer accepting messages
    #[error("Dispatcher is not running")]
    DispatcherGone,
}
