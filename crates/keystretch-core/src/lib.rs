//! # Keystretch Core
//!
//! Runs one long, memory-hard key derivation at a time on a background thread
//! and lets callers start it, poll it, collect its result or terminate it.
//!
//! ## Architecture
//!
//! - **kdf**: derivation inputs and outputs, the [`CancellableWork`] seam and
//!   the default iterated Argon2id work unit
//! - **worker**: runs one work unit on its own thread
//! - **controller**: the start/status/result/terminate state machine
//! - **dispatcher**: a single-threaded actor feeding control messages to a
//!   controller
//! - **protocol** / **reply**: control messages, status snapshots and reply
//!   channels
//! - **diagnostics**: sink for failures that are swallowed rather than raised

pub mod controller;
pub mod diagnostics;
pub mod dispatcher;
pub mod error;
pub mod kdf;
pub mod protocol;
pub mod reply;
pub mod worker;

pub use controller::JobController;
pub use diagnostics::{Diagnostics, FailureReport, TracingDiagnostics};
pub use dispatcher::Dispatcher;
pub use error::{Result, StretchError};
pub use kdf::{
    Argon2Work, CancellableWork, EncryptionParameters, KdfCost, KdfParameters, WorkError,
};
pub use protocol::{ControlMessage, MessageKind};
pub use reply::{JobStatus, Reply, ReplyChannel, ReplyError};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
