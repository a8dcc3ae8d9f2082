//! Synchronous executor.

use super::ready::ReadyHandle;
use sequent_core::{Completion, Executor, RequestSet, SequenceError};
use std::fmt::Debug;

/// An executor that runs requests on the caller's stack.
///
/// `submit` calls the wrapped function and resolves the completion before it
/// returns, so the verdict of the sequence (including fatal resolutions)
/// propagates straight back out of `attach` or `start`.
///
/// Handlers that attach the next request from inside a resolution make the
/// chain run depth-first on the same stack.
///
/// # Example
///
/// ```rust,ignore
/// let executor = InlineExecutor::new(|request: ApiRequest| match request {
///     ApiRequest::FetchScore(_) => Ok::<_, ApiError>(ApiOutput::FetchScore(42)),
///     ApiRequest::FetchProfile(_) => Err(ApiError::NotFound),
/// });
/// ```
pub struct InlineExecutor<F> {
    run: F,
    ready: ReadyHandle,
}

impl<F> InlineExecutor<F> {
    /// Create an executor around a synchronous request function.
    pub fn new(run: F) -> Self {
        Self {
            run,
            ready: ReadyHandle::default(),
        }
    }

    /// Get a handle for pausing the executor.
    pub fn ready_handle(&self) -> ReadyHandle {
        self.ready.clone()
    }
}

impl<S, F, E> Executor<S> for InlineExecutor<F>
where
    S: RequestSet,
    F: Fn(S) -> Result<S::Output, E> + Send + Sync + 'static,
    E: Debug + Send + 'static,
{
    type Error = E;

    fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }

    fn submit(
        &self,
        request: S,
        completion: Completion<S::Output, E>,
    ) -> Result<(), SequenceError> {
        self.ready.admit();
        completion.complete((self.run)(request))
    }
}
