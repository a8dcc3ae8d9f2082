//! # Executor Boundary
//!
//! The executor is the external engine that actually performs a request. A
//! sequence hands it one request at a time together with a [`Completion`],
//! and the executor reports back exactly once, whenever the work finishes.
//!
//! Executors may resolve synchronously (inside [`Executor::submit`]) or later
//! from another task or thread. Either way the verdict returned by
//! [`Completion::complete`] must reach someone: synchronous executors return
//! it from `submit`, asynchronous ones surface it on their own task.

use crate::error::SequenceError;
use std::fmt::{self, Debug};

type CompletionFn<O, E> = Box<dyn FnOnce(Result<O, E>) -> Result<(), SequenceError> + Send>;

/// The callback an executor invokes once a submitted request resolves.
///
/// A completion is consumed by [`complete`](Completion::complete), so it can
/// deliver at most one result.
pub struct Completion<O, E> {
    callback: Option<CompletionFn<O, E>>,
}

impl<O, E> Completion<O, E> {
    /// Wrap a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(Result<O, E>) -> Result<(), SequenceError> + Send + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Deliver the result of the request.
    ///
    /// Returns the sequence's verdict: `Ok(())` when a handler took the result,
    /// or the error describing why nothing could.
    pub fn complete(mut self, result: Result<O, E>) -> Result<(), SequenceError> {
        match self.callback.take() {
            Some(callback) => callback(result),
            None => Ok(()),
        }
    }

    /// Shorthand for `complete(Ok(output))`.
    pub fn succeed(self, output: O) -> Result<(), SequenceError> {
        self.complete(Ok(output))
    }

    /// Shorthand for `complete(Err(error))`.
    pub fn fail(self, error: E) -> Result<(), SequenceError> {
        self.complete(Err(error))
    }
}

impl<O, E> Drop for Completion<O, E> {
    fn drop(&mut self) {
        if self.callback.is_some() {
            // The sequence stays in flight forever; nothing else will resolve it.
            #[cfg(feature = "tracing")]
            tracing::warn!("completion dropped without a result; the sequence will not advance");
        }
    }
}

impl<O, E> Debug for Completion<O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

/// The engine that performs requests on behalf of a sequence.
///
/// # Contract
///
/// - `submit` is called at most once per attached request.
/// - The completion must be invoked exactly once.
/// - `submit` must not fail on its own account; an executor that cannot take
///   work reports it through [`is_ready`](Executor::is_ready). The only errors
///   `submit` returns are verdicts of completions it resolved synchronously.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot execute requests of `{S}`",
    label = "missing `Executor<{S}>` implementation",
    note = "Implement `Executor<{S}>` to run requests of this set."
)]
pub trait Executor<S>: Send + Sync + 'static
where
    S: crate::request::RequestSet,
{
    /// The failure a request can resolve with.
    type Error: Debug + Send + 'static;

    /// Whether the executor accepts work right now.
    fn is_ready(&self) -> bool;

    /// Start executing `request`, reporting the result through `completion`.
    fn submit(
        &self,
        request: S,
        completion: Completion<S::Output, Self::Error>,
    ) -> Result<(), SequenceError>;
}

impl<S, X> Executor<S> for std::sync::Arc<X>
where
    S: crate::request::RequestSet,
    X: Executor<S>,
{
    type Error = X::Error;

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn submit(
        &self,
        request: S,
        completion: Completion<S::Output, Self::Error>,
    ) -> Result<(), SequenceError> {
        (**self).submit(request, completion)
    }
}
