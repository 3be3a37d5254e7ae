//! The dispatch thread: a single-threaded actor that owns a [`JobController`].
//!
//! Control messages are processed one at a time, in arrival order. Because
//! only this thread ever touches the controller, control-state transitions
//! need no locks.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::controller::JobController;
use crate::diagnostics::{Diagnostics, FailureReport, TracingDiagnostics};
use crate::error::{Result, StretchError};
use crate::kdf::{EncryptionParameters, KdfParameters};
use crate::protocol::ControlMessage;
use crate::reply::{JobStatus, Reply};

const THREAD_NAME: &str = "keystretch-dispatch";

/// Handle to a running dispatch thread.
///
/// Dropping the handle shuts the thread down, terminating any running job.
#[derive(Debug)]
pub struct Dispatcher {
    sender: Option<Sender<ControlMessage>>,
    handle: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Move `controller` onto a new dispatch thread.
    ///
    /// Failed starts are logged and reported to a [`TracingDiagnostics`] sink.
    pub fn spawn(controller: JobController) -> Result<Self> {
        Self::spawn_with_diagnostics(controller, Arc::new(TracingDiagnostics))
    }

    pub fn spawn_with_diagnostics(
        controller: JobController,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run(controller, receiver, diagnostics.as_ref()))?;
        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Queue a message for the dispatch thread.
    pub fn send(&self, message: ControlMessage) -> Result<()> {
        self.sender
            .as_ref()
            .ok_or(StretchError::DispatcherGone)?
            .send(message)
            .map_err(|_| StretchError::DispatcherGone)
    }

    pub fn start(&self, params: KdfParameters) -> Result<()> {
        self.send(ControlMessage::Start(params))
    }

    pub fn terminate(&self) -> Result<()> {
        self.send(ControlMessage::Terminate)
    }

    /// Ask for the current status and wait for the reply.
    ///
    /// Queued behind any earlier message, including a blocking terminate.
    pub fn status(&self) -> Result<JobStatus> {
        let (reply_tx, reply_rx) = mpsc::channel::<Reply>();
        self.send(ControlMessage::GetStatus(Box::new(reply_tx)))?;
        match reply_rx.recv() {
            Ok(Reply::Status(status)) => Ok(status),
            _ => Err(StretchError::DispatcherGone),
        }
    }

    /// Ask for the current result and wait for the reply.
    pub fn result(&self) -> Result<Option<Arc<EncryptionParameters>>> {
        let (reply_tx, reply_rx) = mpsc::channel::<Reply>();
        self.send(ControlMessage::GetResult(Box::new(reply_tx)))?;
        match reply_rx.recv() {
            Ok(Reply::Result(result)) => Ok(result),
            _ => Err(StretchError::DispatcherGone),
        }
    }

    /// Close the message queue, let the controller tear down its job, and
    /// wait for the thread to exit.
    ///
    /// # Panics
    ///
    /// Resumes a panic raised on the dispatch thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            if let Err(payload) = handle.join() {
                if !thread::panicking() {
                    std::panic::resume_unwind(payload);
                }
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    mut controller: JobController,
    receiver: Receiver<ControlMessage>,
    diagnostics: &dyn Diagnostics,
) {
    debug!("dispatcher started");
    for message in receiver {
        let kind = message.kind();
        if let Err(err) = controller.handle(message) {
            error!(?kind, %err, "control message failed");
            diagnostics.report(&FailureReport::StartFailed {
                detail: err.to_string(),
            });
        }
    }
    debug!("dispatcher stopping");
}
