//! Timeout wrapper for time-limited requests.

use super::Service;
use sequent_core::RequestSet;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Error produced when a request exceeds its time limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("request timed out after {0:?}")]
pub struct TimeoutError(pub Duration);

/// A service that wraps another service with a timeout.
///
/// The inner service's error type must be constructible from
/// [`TimeoutError`], so a timed-out request resolves as an ordinary failure
/// and is routed to failure handlers like any other.
pub struct TimeoutService<Svc> {
    inner: Svc,
    duration: Duration,
}

impl<Svc> TimeoutService<Svc> {
    /// Create a new timeout service.
    pub fn new(inner: Svc, duration: Duration) -> Self {
        Self { inner, duration }
    }

    /// The configured time limit.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<S, Svc> Service<S> for TimeoutService<Svc>
where
    S: RequestSet,
    Svc: Service<S>,
    Svc::Error: From<TimeoutError>,
{
    type Error = Svc::Error;

    async fn call(&self, request: S) -> Result<S::Output, Self::Error> {
        match timeout(self.duration, self.inner.call(request)).await {
            Ok(result) => result,
            Err(_) => Err(TimeoutError(self.duration).into()),
        }
    }
}
