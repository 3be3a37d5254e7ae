//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// The derivation ran out of memory.
    pub const DERIVATION_FAILED: i32 = 6;

    /// The derivation was terminated after `--timeout-secs`.
    pub const TIMED_OUT: i32 = 7;
}

/// Default status poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Resolution of the progress bar.
pub const PROGRESS_SCALE: u64 = 1000;
