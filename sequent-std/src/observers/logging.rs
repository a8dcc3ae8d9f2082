//! Logging observer for sequence diagnostics.

use sequent_core::{Observer, RequestSet};
use std::fmt::Debug;

/// An observer that logs every dispatch and resolution.
///
/// It uses the `tracing` crate when the `tracing` feature is enabled and is a
/// no-op otherwise.
///
/// # Example
///
/// ```rust,ignore
/// let sequence = SequenceBuilder::new(executor)
///     .observe(LoggingObserver::named("profile_flow"))
///     .build();
/// ```
pub struct LoggingObserver {
    name: &'static str,
}

impl LoggingObserver {
    /// Create a new `LoggingObserver` with a default name.
    pub fn new() -> Self {
        Self { name: "request_sequence" }
    }

    /// Create a new `LoggingObserver` with a custom name.
    ///
    /// The name identifies the sequence in log lines.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }

    /// The name used in log lines.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E> Observer<S, E> for LoggingObserver
where
    S: RequestSet,
    E: Debug,
{
    fn on_dispatch(&self, kind: S::Kind) {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!(name = %self.name, ?kind, "execute request");
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = kind;
        }
    }

    fn on_success(&self, kind: S::Kind, output: &S::Output) {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!(name = %self.name, ?kind, ?output, "request succeeded");
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = (kind, output);
        }
    }

    fn on_failure(&self, kind: S::Kind, error: &E, had_specific_handler: bool) {
        #[cfg(feature = "tracing")]
        {
            if had_specific_handler {
                tracing::debug!(
                    name = %self.name,
                    ?kind,
                    ?error,
                    had_specific_handler,
                    "request failed"
                );
            } else {
                tracing::warn!(
                    name = %self.name,
                    ?kind,
                    ?error,
                    had_specific_handler,
                    "request failed"
                );
            }
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = (kind, error, had_specific_handler);
        }
    }
}
