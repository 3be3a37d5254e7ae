//! Reporting for failures the core swallows.
//!
//! Undeliverable replies and resource-exhausted derivations never reach the
//! caller as errors. They are handed to a [`Diagnostics`] sink instead, which
//! the embedding application may wire to crash reporting or metrics.

use std::fmt;

use tracing::warn;

use crate::protocol::MessageKind;

/// A swallowed failure worth telling someone about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReport {
    /// A status or result reply could not be delivered.
    ReplyUnreachable { kind: MessageKind, detail: String },
    /// A derivation ran out of memory and was recorded as failed.
    ResourceExhausted { detail: String },
    /// The worker thread for a new job could not be spawned.
    StartFailed { detail: String },
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReport::ReplyUnreachable { kind, detail } => {
                write!(f, "{:?} reply not delivered: {}", kind, detail)
            }
            FailureReport::ResourceExhausted { detail } => {
                write!(f, "derivation failed and was reported to the caller as an error: {}", detail)
            }
            FailureReport::StartFailed { detail } => {
                write!(f, "derivation could not be started: {}", detail)
            }
        }
    }
}

/// Sink for [`FailureReport`]s.
pub trait Diagnostics: Send + Sync {
    fn report(&self, report: &FailureReport);
}

/// Default sink: one `warn` event per report.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, report: &FailureReport) {
        warn!(target: "keystretch::diagnostics", %report, "swallowed failure");
    }
}
