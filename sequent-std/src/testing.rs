//! Testing utilities for Sequent.
//!
//! This module provides collaborators that make sequences easy to drive from
//! tests.
//!
//! # Features
//!
//! - [`ManualExecutor`]: records submissions and resolves them only when told to
//! - [`RecordingObserver`]: records every diagnostic event it receives

use crate::executors::ReadyHandle;
use sequent_core::{Completion, Executor, Member, Observer, RequestSet, SequenceError};
use std::{
    collections::VecDeque,
    fmt::Debug,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

// ============================================================================
// Manual Executor
// ============================================================================

/// A request handed to a [`ManualExecutor`] and not yet resolved.
pub struct Submission<S: RequestSet, E> {
    /// The submitted request.
    pub request: S,
    completion: Completion<S::Output, E>,
}

impl<S: RequestSet, E> Submission<S, E> {
    /// The kind of the submitted request.
    pub fn kind(&self) -> S::Kind {
        self.request.kind()
    }

    /// Resolve with an arbitrary result.
    pub fn complete(self, result: Result<S::Output, E>) -> Result<(), SequenceError> {
        self.completion.complete(result)
    }

    /// Resolve successfully.
    pub fn succeed(self, output: S::Output) -> Result<(), SequenceError> {
        self.completion.succeed(output)
    }

    /// Resolve with a failure.
    pub fn fail(self, error: E) -> Result<(), SequenceError> {
        self.completion.fail(error)
    }
}

/// An executor that holds submissions until the test resolves them.
///
/// Share it with the sequence through an `Arc` to keep a handle in the test.
///
/// # Example
///
/// ```rust,ignore
/// let executor = Arc::new(ManualExecutor::<ApiRequest, ApiError>::new());
/// let sequence = Sequence::new(executor.clone());
///
/// sequence.attach(FetchProfile { user_id: 1 })?;
/// sequence.start()?;
/// assert_eq!(executor.submitted_count(), 1);
///
/// executor.succeed_next_as::<FetchProfile>(profile)?;
/// ```
pub struct ManualExecutor<S: RequestSet, E> {
    queue: Mutex<VecDeque<Submission<S, E>>>,
    submitted: AtomicUsize,
    ready: ReadyHandle,
}

impl<S: RequestSet, E> ManualExecutor<S, E> {
    /// Create a new, ready executor.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            submitted: AtomicUsize::new(0),
            ready: ReadyHandle::default(),
        }
    }

    /// Get a handle for pausing the executor.
    pub fn ready_handle(&self) -> ReadyHandle {
        self.ready.clone()
    }

    /// Total number of `submit` calls so far.
    pub fn submitted_count(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    /// Number of submissions waiting to be resolved.
    pub fn unresolved(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// The kind of the oldest unresolved submission.
    pub fn next_kind(&self) -> Option<S::Kind> {
        self.queue.lock().unwrap().front().map(Submission::kind)
    }

    /// Remove the oldest unresolved submission.
    pub fn take_next(&self) -> Option<Submission<S, E>> {
        self.queue.lock().unwrap().pop_front()
    }

    /// Resolve the oldest submission with `result`.
    ///
    /// # Panics
    ///
    /// Panics if nothing is waiting to be resolved.
    pub fn resolve_next(&self, result: Result<S::Output, E>) -> Result<(), SequenceError> {
        // The queue lock is released before resolving; handlers may submit again.
        let submission = self
            .take_next()
            .expect("ManualExecutor has no unresolved submission");
        submission.complete(result)
    }

    /// Resolve the oldest submission successfully.
    pub fn succeed_next(&self, output: S::Output) -> Result<(), SequenceError> {
        self.resolve_next(Ok(output))
    }

    /// Resolve the oldest submission with the output of request type `M`.
    pub fn succeed_next_as<M: Member<S>>(&self, output: M::Output) -> Result<(), SequenceError> {
        self.resolve_next(Ok(M::into_output(output)))
    }

    /// Resolve the oldest submission with a failure.
    pub fn fail_next(&self, error: E) -> Result<(), SequenceError> {
        self.resolve_next(Err(error))
    }
}

impl<S: RequestSet, E> Default for ManualExecutor<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E> Executor<S> for ManualExecutor<S, E>
where
    S: RequestSet,
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
        self.submitted.fetch_add(1, Ordering::SeqCst);
        self.ready.admit();
        self.queue.lock().unwrap().push_back(Submission {
            request,
            completion,
        });
        Ok(())
    }
}

// ============================================================================
// Recording Observer
// ============================================================================

/// A diagnostic event captured by a [`RecordingObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed<K> {
    /// A request was handed to the executor.
    Dispatched(K),
    /// A request resolved successfully.
    Succeeded(K),
    /// A request resolved with a failure.
    Failed {
        /// Kind of the failed request.
        kind: K,
        /// Whether a failure handler was registered for that kind.
        had_specific_handler: bool,
    },
}

/// An observer that records all events it receives.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingObserver::new();
/// let sequence = SequenceBuilder::new(executor).observe(recorder.clone()).build();
///
/// // ... drive the sequence ...
///
/// assert_eq!(recorder.events()[0], Observed::Dispatched(ApiKind::FetchProfile));
/// ```
pub struct RecordingObserver<K> {
    events: Arc<Mutex<Vec<Observed<K>>>>,
}

impl<K: Clone> RecordingObserver<K> {
    /// Create a new recording observer.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a clone of the recorded events.
    pub fn events(&self) -> Vec<Observed<K>> {
        self.events.lock().unwrap().clone()
    }

    /// Get the number of recorded events.
    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn record(&self, event: Observed<K>) {
        self.events.lock().unwrap().push(event);
    }
}

impl<K: Clone> Default for RecordingObserver<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for RecordingObserver<K> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}

impl<S: RequestSet, E> Observer<S, E> for RecordingObserver<S::Kind> {
    fn on_dispatch(&self, kind: S::Kind) {
        self.record(Observed::Dispatched(kind));
    }

    fn on_success(&self, kind: S::Kind, _output: &S::Output) {
        self.record(Observed::Succeeded(kind));
    }

    fn on_failure(&self, kind: S::Kind, _error: &E, had_specific_handler: bool) {
        self.record(Observed::Failed {
            kind,
            had_specific_handler,
        });
    }
}
