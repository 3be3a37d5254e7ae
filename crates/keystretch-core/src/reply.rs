//! Status snapshots and the channels replies are written to.

use std::sync::mpsc::{Sender, SyncSender};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::kdf::EncryptionParameters;
use crate::protocol::MessageKind;

/// Point-in-time view of the controller, computed fresh for every query.
///
/// `has_result` and `has_error` are mutually exclusive and both imply
/// `!is_running`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub is_running: bool,
    pub progress: f64,
    pub has_result: bool,
    pub has_error: bool,
}

impl JobStatus {
    /// Status of a controller with no job.
    pub const IDLE: JobStatus = JobStatus {
        is_running: false,
        progress: 0.0,
        has_result: false,
        has_error: false,
    };
}

/// A reply to [`crate::ControlMessage::GetStatus`] or
/// [`crate::ControlMessage::GetResult`].
#[derive(Debug, Clone)]
pub enum Reply {
    Status(JobStatus),
    Result(Option<Arc<EncryptionParameters>>),
}

impl Reply {
    pub fn kind(&self) -> MessageKind {
        match self {
            Reply::Status(_) => MessageKind::Status,
            Reply::Result(_) => MessageKind::Result,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplyError {
    /// The recipient has gone away.
    #[error("reply recipient disconnected")]
    Disconnected,
}

/// Destination a caller supplies with each query.
pub trait ReplyChannel: Send {
    fn send(&self, reply: Reply) -> Result<(), ReplyError>;
}

impl ReplyChannel for Sender<Reply> {
    fn send(&self, reply: Reply) -> Result<(), ReplyError> {
        Sender::send(self, reply).map_err(|_| ReplyError::Disconnected)
    }
}

impl ReplyChannel for SyncSender<Reply> {
    fn send(&self, reply: Reply) -> Result<(), ReplyError> {
        SyncSender::send(self, reply).map_err(|_| ReplyError::Disconnected)
    }
}
