//! Diagnostics side channel.
//!
//! Observers see every request a sequence dispatches and how it resolved.
//! They are notified synchronously and cannot influence dispatch.

use crate::request::RequestSet;

/// Receives structured diagnostics from a sequence.
///
/// All methods default to no-ops, so an observer only overrides the events it
/// cares about.
///
/// # Example
///
/// ```rust,ignore
/// struct FailureCounter(AtomicUsize);
///
/// impl<S: RequestSet, E> Observer<S, E> for FailureCounter {
///     fn on_failure(&self, _kind: S::Kind, _error: &E, _had_specific_handler: bool) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait Observer<S: RequestSet, E>: Send + Sync + 'static {
    /// A request of `kind` was handed to the executor.
    fn on_dispatch(&self, kind: S::Kind) {
        let _ = kind;
    }

    /// A request of `kind` resolved with `output`.
    fn on_success(&self, kind: S::Kind, output: &S::Output) {
        let _ = (kind, output);
    }

    /// A request of `kind` resolved with `error`.
    ///
    /// `had_specific_handler` is `false` when the failure falls through to the
    /// default handler, or to nothing at all.
    fn on_failure(&self, kind: S::Kind, error: &E, had_specific_handler: bool) {
        let _ = (kind, error, had_specific_handler);
    }
}
