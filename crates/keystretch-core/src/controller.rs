//! The job-lifecycle state machine.
//!
//! ```text
//!            start                 worker completes
//!   Idle ───────────▶ Running ─────────────────────▶ Completed(result)
//!    ▲                  │  │   worker out of memory
//!    │    cancelled     │  └─────────────────────────▶ Failed
//!    └──────────────────┘
//!
//!   start from any state supersedes the current job;
//!   terminate from any state returns to Idle.
//! ```
//!
//! A `JobController` is driven from exactly one thread at a time (`&mut self`
//! on every operation), so its own fields need no locking. The only state
//! written by another thread is the progress cell inside [`KdfParameters`]
//! and the worker's outcome, which is read through the join handle.

use std::sync::Arc;
use std::thread;

use tracing::{debug, error, info};

use crate::diagnostics::{Diagnostics, FailureReport, TracingDiagnostics};
use crate::error::Result;
use crate::kdf::{Argon2Work, CancellableWork, EncryptionParameters, KdfParameters};
use crate::protocol::ControlMessage;
use crate::reply::{JobStatus, Reply, ReplyChannel};
use crate::worker::{Outcome, Worker};

/// Terminal state of a job whose worker has been joined.
enum Settled {
    Completed(Arc<EncryptionParameters>),
    Failed,
    Cancelled,
}

/// The single active (or most recently finished) job.
struct Job {
    params: Arc<KdfParameters>,
    /// `Some` until the worker is joined.
    worker: Option<Worker>,
    settled: Option<Settled>,
}

impl Job {
    /// Join the worker if it has already exited. Never blocks on a live worker.
    fn reap(&mut self) {
        if self.worker.as_ref().is_some_and(Worker::is_finished) {
            self.settle();
        }
    }

    /// Join the worker, waiting for it if necessary.
    fn settle(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.settled = Some(match worker.join() {
                Outcome::Completed(result) => Settled::Completed(result),
                Outcome::Failed => Settled::Failed,
                Outcome::Cancelled => Settled::Cancelled,
            });
        }
    }

    fn status(&self) -> JobStatus {
        JobStatus {
            is_running: self.worker.is_some(),
            progress: self.params.progress(),
            has_result: matches!(self.settled, Some(Settled::Completed(_))),
            has_error: matches!(self.settled, Some(Settled::Failed)),
        }
    }

    fn result(&self) -> Option<Arc<EncryptionParameters>> {
        match &self.settled {
            Some(Settled::Completed(result)) => Some(Arc::clone(result)),
            _ => None,
        }
    }
}

/// Owns at most one derivation job and answers queries about it.
pub struct JobController {
    work: Arc<dyn CancellableWork>,
    diagnostics: Arc<dyn Diagnostics>,
    job: Option<Job>,
}

impl JobController {
    pub fn new(work: Arc<dyn CancellableWork>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            work,
            diagnostics,
            job: None,
        }
    }

    /// Controller running [`Argon2Work`] and logging diagnostics via `tracing`.
    pub fn with_argon2() -> Self {
        Self::new(Arc::new(Argon2Work), Arc::new(TracingDiagnostics))
    }

    /// Stop any current job, then start deriving `params` in the background.
    ///
    /// # Errors
    ///
    /// Returns `StretchError::Spawn` if the worker thread cannot be created;
    /// the controller is left idle.
    pub fn start(&mut self, params: KdfParameters) -> Result<()> {
        self.terminate();

        let params = Arc::new(params);
        let worker = Worker::spawn(
            Arc::clone(&self.work),
            Arc::clone(&params),
            Arc::clone(&self.diagnostics),
        )?;
        info!(cost = ?params.cost(), "job started");
        self.job = Some(Job {
            params,
            worker: Some(worker),
            settled: None,
        });
        Ok(())
    }

    /// Snapshot of the current job.
    pub fn status(&mut self) -> JobStatus {
        match self.job.as_mut() {
            Some(job) => {
                job.reap();
                job.status()
            }
            None => JobStatus::IDLE,
        }
    }

    /// The derived result, if the current job completed.
    pub fn result(&mut self) -> Option<Arc<EncryptionParameters>> {
        let job = self.job.as_mut()?;
        job.reap();
        job.result()
    }

    /// Write [`Self::status`] to `reply`. Delivery failures go to diagnostics.
    pub fn get_status(&mut self, reply: &dyn ReplyChannel) {
        let status = self.status();
        self.deliver(reply, Reply::Status(status));
    }

    /// Write [`Self::result`] to `reply`. Delivery failures go to diagnostics.
    pub fn get_result(&mut self, reply: &dyn ReplyChannel) {
        let result = self.result();
        self.deliver(reply, Reply::Result(result));
    }

    /// Cancel the current job and wait for its worker to exit.
    ///
    /// Blocks for as long as the work unit takes to notice the cancellation.
    /// Whatever the job produced is discarded. No-op when idle.
    pub fn terminate(&mut self) {
        let Some(mut job) = self.job.take() else {
            return;
        };
        if job.worker.is_some() {
            debug!(progress = job.params.progress(), "cancelling running job");
            job.params.request_cancel();
            job.settle();
        }
        info!("job terminated");
    }

    /// Dispatch one control message.
    ///
    /// # Errors
    ///
    /// Only `Start` can fail; see [`Self::start`].
    pub fn handle(&mut self, message: ControlMessage) -> Result<()> {
        match message {
            ControlMessage::Start(params) => self.start(params)?,
            ControlMessage::GetStatus(reply) => self.get_status(reply.as_ref()),
            ControlMessage::GetResult(reply) => self.get_result(reply.as_ref()),
            ControlMessage::Terminate => self.terminate(),
        }
        Ok(())
    }

    fn deliver(&self, reply: &dyn ReplyChannel, message: Reply) {
        let kind = message.kind();
        if let Err(err) = reply.send(message) {
            // The caller asked for an update and is no longer listening.
            self.diagnostics.report(&FailureReport::ReplyUnreachable {
                kind,
                detail: err.to_string(),
            });
        }
    }
}

impl Drop for JobController {
    fn drop(&mut self) {
        if !thread::panicking() {
            self.terminate();
            return;
        }
        // Already unwinding: a worker panic cannot be resumed here.
        if let Some(job) = self.job.take() {
            job.params.request_cancel();
            if let Some(worker) = job.worker {
                if worker.try_join().is_err() {
                    error!("worker panicked while the controller was unwinding");
                }
            }
        }
    }
}

impl std::fmt::Debug for JobController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobController")
            .field("has_job", &self.job.is_some())
            .finish()
    }
}
