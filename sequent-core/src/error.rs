//! Error types for Sequent.
//!
//! - [`SequenceError`] - every misuse or fatal resolution a coordinator can report
//! - [`BoxError`] - boxed error returned by handlers

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by a request sequence.
///
/// Failures reported by the executor are *not* errors of the sequence; they are
/// routed to failure handlers. The variants here describe misuse of the
/// coordinator or a resolution that nothing was registered to receive.
///
/// Kinds and executor errors are captured as their `Debug` rendering so this
/// type stays independent of any particular request set.
#[derive(Error, Debug)]
pub enum SequenceError {
    /// A request was attached while another one was still pending.
    #[error("parallel execution not allowed: {attempted} attached while {pending} is pending")]
    ConcurrencyViolation {
        /// Kind of the request occupying the slot.
        pending: String,
        /// Kind of the rejected request.
        attempted: String,
    },

    /// `start` was called with no request attached.
    #[error("at least one request must be attached before the sequence is started")]
    NotReady,

    /// The executor reported it cannot accept work.
    #[error("executor is not ready to accept work")]
    ExecutorUnavailable,

    /// A request succeeded and no success handler is registered for its kind.
    #[error("no success handler registered for {kind}")]
    UnhandledSuccess {
        /// Kind of the resolved request.
        kind: String,
    },

    /// A request failed and neither a specific nor a default failure handler is set.
    #[error("no failure handler registered for {kind} and no default is set: {error}")]
    UnhandledFailure {
        /// Kind of the resolved request.
        kind: String,
        /// The executor error that went unhandled.
        error: String,
    },

    /// The executor resolved a request with an output of a different kind.
    #[error("executor returned output for {actual} while {expected} was in flight")]
    OutputMismatch {
        /// Kind of the in-flight request.
        expected: String,
        /// Kind of the output that came back.
        actual: String,
    },

    /// A handler returned an error.
    #[error("handler error: {0}")]
    Handler(#[source] BoxError),
}

impl SequenceError {
    /// Returns `true` for resolutions that indicate a configuration mistake
    /// rather than a call-order mistake.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SequenceError::UnhandledSuccess { .. }
                | SequenceError::UnhandledFailure { .. }
                | SequenceError::OutputMismatch { .. }
        )
    }
}

impl From<BoxError> for SequenceError {
    fn from(err: BoxError) -> Self {
        SequenceError::Handler(err)
    }
}
