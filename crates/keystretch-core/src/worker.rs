//! Runs one derivation on its own thread.
//!
//! The thread's return value is the job's [`Outcome`]. It becomes visible to
//! the controller only through [`Worker::join`], so a result can never be
//! observed half-written.

use std::panic;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::diagnostics::{Diagnostics, FailureReport};
use crate::error::Result;
use crate::kdf::{CancellableWork, EncryptionParameters, KdfParameters, WorkError};

const THREAD_NAME: &str = "keystretch-worker";

/// How a worker thread ended.
#[derive(Debug)]
pub enum Outcome {
    Completed(Arc<EncryptionParameters>),
    /// Resource exhaustion; already reported to diagnostics.
    Failed,
    Cancelled,
}

/// Handle to a running (or finished, not yet joined) worker thread.
#[derive(Debug)]
pub struct Worker {
    handle: JoinHandle<Outcome>,
}

impl Worker {
    /// Start `work` on a new thread.
    ///
    /// `params` stays shared with the caller so it can read progress and
    /// request cancellation while the thread runs.
    pub fn spawn(
        work: Arc<dyn CancellableWork>,
        params: Arc<KdfParameters>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self> {
        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run(work.as_ref(), &params, diagnostics.as_ref()))?;
        Ok(Self { handle })
    }

    /// True once the thread has exited. Never blocks.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread to exit and take its outcome.
    ///
    /// # Panics
    ///
    /// If the work unit panicked, the panic is resumed on the calling thread.
    pub fn join(self) -> Outcome {
        match self.try_join() {
            Ok(outcome) => outcome,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Wait for the thread to exit, handing back a panic payload instead of
    /// resuming it.
    pub fn try_join(self) -> thread::Result<Outcome> {
        self.handle.join()
    }
}

fn run(work: &dyn CancellableWork, params: &KdfParameters, diagnostics: &dyn Diagnostics) -> Outcome {
    debug!(cost = ?params.cost(), "derivation started");
    match work.generate(params) {
        Ok(result) => {
            info!(fingerprint = %result.fingerprint(), "derivation completed");
            Outcome::Completed(Arc::new(result))
        }
        Err(WorkError::Cancelled) => {
            debug!(progress = params.progress(), "derivation cancelled");
            Outcome::Cancelled
        }
        Err(WorkError::ResourceExhausted(detail)) => {
            diagnostics.report(&FailureReport::ResourceExhausted { detail });
            Outcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use zeroize::Zeroizing;

    use super::*;
    use crate::kdf::{KdfCost, KEY_LENGTH};

    type WorkResult = std::result::Result<EncryptionParameters, WorkError>;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<FailureReport>>);

    impl Diagnostics for Recorder {
        fn report(&self, report: &FailureReport) {
            self.0.lock().unwrap().push(report.clone());
        }
    }

    fn params() -> Arc<KdfParameters> {
        Arc::new(
            KdfParameters::new("test-passphrase", b"salt-1234567890123456", KdfCost::default())
                .unwrap(),
        )
    }

    fn spawn_with<W>(work: W, diagnostics: Arc<Recorder>) -> Worker
    where
        W: CancellableWork + 'static,
    {
        Worker::spawn(Arc::new(work), params(), diagnostics).unwrap()
    }

    #[test]
    fn test_completed_outcome_carries_result() {
        let work = |p: &KdfParameters| -> WorkResult {
            Ok(EncryptionParameters::new(
                Zeroizing::new([9u8; KEY_LENGTH]),
                p.salt().to_vec(),
                p.cost(),
            ))
        };
        let outcome = spawn_with(work, Arc::default()).join();
        match outcome {
            Outcome::Completed(result) => assert_eq!(result.key(), &[9u8; KEY_LENGTH]),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_cancelled_is_silent() {
        let diagnostics = Arc::new(Recorder::default());
        let work = |_: &KdfParameters| -> WorkResult { Err(WorkError::Cancelled) };
        let outcome = spawn_with(work, diagnostics.clone()).join();
        assert!(matches!(outcome, Outcome::Cancelled));
        assert!(diagnostics.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_resource_exhaustion_is_reported() {
        let diagnostics = Arc::new(Recorder::default());
        let work = |_: &KdfParameters| -> WorkResult {
            Err(WorkError::ResourceExhausted("oom".to_string()))
        };
        let outcome = spawn_with(work, diagnostics.clone()).join();
        assert!(matches!(outcome, Outcome::Failed));
        assert_eq!(
            diagnostics.0.lock().unwrap().as_slice(),
            &[FailureReport::ResourceExhausted {
                detail: "oom".to_string()
            }]
        );
    }

    #[test]
    #[should_panic(expected = "corrupted state")]
    fn test_work_panic_resumes_on_join() {
        let work = |_: &KdfParameters| -> WorkResult {
            panic!("corrupted state")
        };
        spawn_with(work, Arc::default()).join();
    }
}
