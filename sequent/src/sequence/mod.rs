//! # Request Sequence
//!
//! A [`Sequence`] runs one request at a time through an [`Executor`] and hands
//! each result to the handler registered for the request's kind. Handlers get
//! the sequence back, so "when A completes, run B" is just a handler that
//! attaches B.
//!
//! # Lifecycle
//!
//! ```text
//!            attach              start
//!   Idle ──────────────► Waiting ───────► InFlight ◄──┐
//!                                            │        │ attach
//!                                 resolved   ▼        │
//!                                        Resolving ──► Armed
//! ```
//!
//! - Attaching while a request is pending fails with `ConcurrencyViolation`.
//! - Before `start`, an attached request only waits. After `start` the
//!   sequence stays armed and every attach dispatches immediately.
//! - The slot is cleared before a handler runs, so the handler can attach the
//!   next request right away.

mod builder;
mod handlers;
mod state;

pub use builder::SequenceBuilder;
pub use handlers::HandlerResult;
pub use state::SequenceState;

use handlers::HandlerRegistry;
use sequent_core::{Completion, Executor, Member, Observer, RequestSet, SequenceError};
use state::Slot;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A single-outstanding-request coordinator.
///
/// Cloning a `Sequence` yields another handle to the same coordinator.
///
/// # Example
///
/// ```rust,ignore
/// let sequence = Sequence::new(executor);
///
/// sequence.on_success::<FetchProfile>(|seq, profile| {
///     seq.attach(FetchScore { user_id: profile.id })?;
///     Ok(())
/// });
/// sequence.on_success::<FetchScore>(|_, score| {
///     println!("score: {score}");
///     Ok(())
/// });
/// sequence.set_default_failure_handler(|_, error| {
///     eprintln!("sequence stopped: {error:?}");
///     Ok(())
/// });
///
/// sequence.attach(FetchProfile { user_id: 1 })?;
/// sequence.start()?;
/// ```
pub struct Sequence<S: RequestSet, X: Executor<S>> {
    inner: Arc<Inner<S, X>>,
}

struct Inner<S: RequestSet, X: Executor<S>> {
    executor: X,
    core: Mutex<Core<S, X>>,
    observers: Vec<Arc<dyn Observer<S, X::Error>>>,
}

struct Core<S: RequestSet, X: Executor<S>> {
    slot: Slot<S>,
    armed: bool,
    next_ticket: u64,
    resolving: usize,
    /// Set while a `dispatch` call is inside `Executor::submit`.
    dispatching: bool,
    /// A request launched while `dispatching`; the running dispatch submits it.
    handoff: Option<(u64, S)>,
    handlers: HandlerRegistry<S, X>,
}

impl<S: RequestSet, X: Executor<S>> Clone for Sequence<S, X> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: RequestSet, X: Executor<S>> Sequence<S, X> {
    /// Create a sequence with no handlers and no observers.
    pub fn new(executor: X) -> Self {
        SequenceBuilder::new(executor).build()
    }

    /// Start building a sequence.
    pub fn builder(executor: X) -> SequenceBuilder<S, X> {
        SequenceBuilder::new(executor)
    }

    pub(crate) fn from_parts(
        executor: X,
        handlers: HandlerRegistry<S, X>,
        observers: Vec<Arc<dyn Observer<S, X::Error>>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                executor,
                core: Mutex::new(Core {
                    slot: Slot::Empty,
                    armed: false,
                    next_ticket: 0,
                    resolving: 0,
                    dispatching: false,
                    handoff: None,
                    handlers,
                }),
                observers,
            }),
        }
    }

    /// The executor requests are handed to.
    pub fn executor(&self) -> &X {
        &self.inner.executor
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Register the success handler for request type `M`, replacing any earlier one.
    pub fn on_success<M: Member<S>>(
        &self,
        handler: impl Fn(&Self, M::Output) -> HandlerResult + Send + Sync + 'static,
    ) {
        self.core()
            .handlers
            .set_success(M::KIND, handlers::typed_success::<S, X, M, _>(handler));
    }

    /// Register the failure handler for request type `M`, replacing any earlier one.
    pub fn on_failure<M: Member<S>>(
        &self,
        handler: impl Fn(&Self, X::Error) -> HandlerResult + Send + Sync + 'static,
    ) {
        self.register_failure_handler(M::KIND, handler);
    }

    /// Register the success handler for `kind`, replacing any earlier one.
    ///
    /// The handler receives the set's output enum; prefer
    /// [`on_success`](Self::on_success) when the request type is known.
    pub fn register_success_handler(
        &self,
        kind: S::Kind,
        handler: impl Fn(&Self, S::Output) -> HandlerResult + Send + Sync + 'static,
    ) {
        self.core()
            .handlers
            .set_success(kind, handlers::raw_success(handler));
    }

    /// Register the failure handler for `kind`, replacing any earlier one.
    pub fn register_failure_handler(
        &self,
        kind: S::Kind,
        handler: impl Fn(&Self, X::Error) -> HandlerResult + Send + Sync + 'static,
    ) {
        self.core()
            .handlers
            .set_failure(kind, handlers::failure(handler));
    }

    /// Set the handler for failures of kinds without a failure handler of their own.
    pub fn set_default_failure_handler(
        &self,
        handler: impl Fn(&Self, X::Error) -> HandlerResult + Send + Sync + 'static,
    ) {
        self.core()
            .handlers
            .set_default_failure(Some(handlers::failure(handler)));
    }

    /// Remove the default failure handler.
    ///
    /// Failures without a specific handler become `UnhandledFailure` again.
    pub fn clear_default_failure_handler(&self) {
        self.core().handlers.set_default_failure(None);
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    /// Attach the next request.
    ///
    /// Fails with [`SequenceError::ConcurrencyViolation`] if a request is
    /// already pending. If the sequence has been started the request is
    /// dispatched before this returns; otherwise it waits for [`start`](Self::start).
    ///
    /// When the sequence is started but the executor is not ready, the request
    /// stays attached and [`SequenceError::ExecutorUnavailable`] is returned;
    /// call `start` again once the executor is back.
    ///
    /// With an executor that resolves synchronously, the verdict of the whole
    /// chain triggered by this request is returned from here. An `attach` made
    /// by a handler inside that chain returns as soon as its request is queued
    /// and the outermost call submits it, so long chains run in constant stack.
    pub fn attach<R: Into<S>>(&self, request: R) -> Result<(), SequenceError> {
        let request = request.into();
        let kind = request.kind();

        let mut core = self.core();
        if let Some(pending) = core.slot.kind() {
            return Err(SequenceError::ConcurrencyViolation {
                pending: format!("{pending:?}"),
                attempted: format!("{kind:?}"),
            });
        }

        core.slot = Slot::Waiting(request);
        if !core.armed {
            #[cfg(feature = "tracing")]
            tracing::debug!(?kind, "request attached, waiting for start");
            return Ok(());
        }
        if !self.inner.executor.is_ready() {
            return Err(SequenceError::ExecutorUnavailable);
        }

        let ticket = core.take_ticket();
        let launched = core.slot.launch(ticket);
        drop(core);

        match launched {
            Some(request) => self.dispatch(ticket, request),
            None => Ok(()),
        }
    }

    /// Start the sequence.
    ///
    /// Dispatches the attached request and arms the sequence, so every later
    /// [`attach`](Self::attach) dispatches immediately.
    ///
    /// Fails with [`SequenceError::NotReady`] when nothing is attached and with
    /// [`SequenceError::ExecutorUnavailable`] when the executor does not accept
    /// work. Starting while a request is already in flight submits nothing.
    pub fn start(&self) -> Result<(), SequenceError> {
        let mut core = self.core();
        if matches!(core.slot, Slot::Empty) {
            return Err(SequenceError::NotReady);
        }
        if matches!(core.slot, Slot::InFlight { .. }) {
            core.armed = true;
            return Ok(());
        }
        if !self.inner.executor.is_ready() {
            return Err(SequenceError::ExecutorUnavailable);
        }

        core.armed = true;
        let ticket = core.take_ticket();
        let launched = core.slot.launch(ticket);
        drop(core);

        #[cfg(feature = "tracing")]
        tracing::debug!("sequence started");

        match launched {
            Some(request) => self.dispatch(ticket, request),
            None => Ok(()),
        }
    }

    /// Submit a launched request.
    ///
    /// Executors that resolve inside `submit` would otherwise grow the stack by
    /// one resolution per chained request. While a dispatch is running, a request
    /// launched by a handler is parked in `handoff` and submitted by the
    /// running dispatch once its `submit` returns.
    fn dispatch(&self, ticket: u64, request: S) -> Result<(), SequenceError> {
        {
            let mut core = self.core();
            if core.dispatching {
                core.handoff = Some((ticket, request));
                return Ok(());
            }
            core.dispatching = true;
        }
        let _dispatching = DispatchGuard(self);

        let mut verdict = Ok(());
        let (mut ticket, mut request) = (ticket, request);
        loop {
            verdict = fold_verdict(verdict, self.submit_one(ticket, request));

            let mut core = self.core();
            match core.handoff.take() {
                Some(next) => (ticket, request) = next,
                None => {
                    core.dispatching = false;
                    return verdict;
                }
            }
        }
    }

    fn submit_one(&self, ticket: u64, request: S) -> Result<(), SequenceError> {
        let kind = request.kind();

        #[cfg(feature = "tracing")]
        tracing::debug!(?kind, ticket, "dispatching request");

        for observer in &self.inner.observers {
            observer.on_dispatch(kind);
        }

        let sequence = Arc::downgrade(&self.inner);
        let completion = Completion::<S::Output, X::Error>::new(move |result| {
            match sequence.upgrade() {
                Some(inner) => Sequence { inner }.resolve(ticket, result),
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(?kind, "sequence dropped before its request resolved");
                    Ok(())
                }
            }
        });

        let verdict = self.inner.executor.submit(request, completion);
        if verdict.is_err() {
            // A request the executor never resolved must not hold the slot.
            let mut core = self.core();
            if core.slot.finish(ticket).is_some() {
                #[cfg(feature = "tracing")]
                tracing::warn!(?kind, "executor rejected request");
            }
        }
        verdict
    }

    fn resolve(
        &self,
        ticket: u64,
        result: Result<S::Output, X::Error>,
    ) -> Result<(), SequenceError> {
        match result {
            Ok(output) => self.resolve_success(ticket, output),
            Err(error) => self.resolve_failure(ticket, error),
        }
    }

    fn resolve_success(&self, ticket: u64, output: S::Output) -> Result<(), SequenceError> {
        let (kind, handler) = {
            let mut core = self.core();
            let Some(kind) = core.slot.finish(ticket) else {
                #[cfg(feature = "tracing")]
                tracing::warn!(ticket, "ignoring completion for a request no longer in flight");
                return Ok(());
            };
            core.resolving += 1;
            (kind, core.handlers.success(kind))
        };
        let _resolving = ResolvingGuard(self);

        let actual = S::output_kind(&output);
        if actual != kind {
            #[cfg(feature = "tracing")]
            tracing::error!(?kind, ?actual, "executor returned output of another request");
            return Err(SequenceError::OutputMismatch {
                expected: format!("{kind:?}"),
                actual: format!("{actual:?}"),
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(?kind, "request succeeded");

        for observer in &self.inner.observers {
            observer.on_success(kind, &output);
        }

        match handler {
            Some(handler) => handler(self, output),
            None => {
                #[cfg(feature = "tracing")]
                tracing::error!(?kind, "no success handler registered");
                Err(SequenceError::UnhandledSuccess {
                    kind: format!("{kind:?}"),
                })
            }
        }
    }

    fn resolve_failure(&self, ticket: u64, error: X::Error) -> Result<(), SequenceError> {
        let (kind, specific, fallback) = {
            let mut core = self.core();
            let Some(kind) = core.slot.finish(ticket) else {
                #[cfg(feature = "tracing")]
                tracing::warn!(ticket, "ignoring completion for a request no longer in flight");
                return Ok(());
            };
            core.resolving += 1;
            (
                kind,
                core.handlers.failure(kind),
                core.handlers.default_failure(),
            )
        };
        let _resolving = ResolvingGuard(self);

        let had_specific_handler = specific.is_some();
        for observer in &self.inner.observers {
            observer.on_failure(kind, &error, had_specific_handler);
        }

        if let Some(handler) = specific {
            #[cfg(feature = "tracing")]
            tracing::debug!(?kind, ?error, "request failed");
            return handler(self, error);
        }

        match fallback {
            Some(handler) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(?kind, ?error, "request failed, using default failure handler");
                handler(self, error)
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::error!(?kind, ?error, "request failed with no failure handler");
                Err(SequenceError::UnhandledFailure {
                    kind: format!("{kind:?}"),
                    error: format!("{error:?}"),
                })
            }
        }
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    /// The current lifecycle state.
    pub fn state(&self) -> SequenceState {
        let core = self.core();
        match core.slot {
            Slot::Waiting(_) => SequenceState::Waiting,
            Slot::InFlight { .. } => SequenceState::InFlight,
            Slot::Empty if core.resolving > 0 => SequenceState::Resolving,
            Slot::Empty if core.armed => SequenceState::Armed,
            Slot::Empty => SequenceState::Idle,
        }
    }

    /// Kind of the pending request, waiting or in flight.
    pub fn pending_kind(&self) -> Option<S::Kind> {
        self.core().slot.kind()
    }

    /// Whether `start` has been called.
    pub fn is_armed(&self) -> bool {
        self.core().armed
    }

    /// Whether a success handler is registered for `kind`.
    pub fn has_success_handler(&self, kind: S::Kind) -> bool {
        self.core().handlers.has_success(kind)
    }

    /// Whether a failure handler is registered for `kind`.
    pub fn has_failure_handler(&self, kind: S::Kind) -> bool {
        self.core().handlers.has_failure(kind)
    }

    /// Whether a default failure handler is set.
    pub fn has_default_failure_handler(&self) -> bool {
        self.core().handlers.has_default_failure()
    }

    // No user code runs while this lock is held, so a poisoned lock still
    // guards consistent state.
    fn core(&self) -> MutexGuard<'_, Core<S, X>> {
        self.inner.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: RequestSet, X: Executor<S>> Core<S, X> {
    fn take_ticket(&mut self) -> u64 {
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.next_ticket
    }
}

/// Keep the first error, unless a later one is fatal and the first is not.
fn fold_verdict(
    verdict: Result<(), SequenceError>,
    next: Result<(), SequenceError>,
) -> Result<(), SequenceError> {
    match (verdict, next) {
        (Ok(()), next) => next,
        (Err(first), Err(later)) if later.is_fatal() && !first.is_fatal() => Err(later),
        (Err(first), _) => Err(first),
    }
}

/// Releases the dispatch loop if a handler or the executor panics.
struct DispatchGuard<'a, S: RequestSet, X: Executor<S>>(&'a Sequence<S, X>);

impl<S: RequestSet, X: Executor<S>> Drop for DispatchGuard<'_, S, X> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            return;
        }
        let mut core = self.0.core();
        core.dispatching = false;
        if let Some((ticket, _)) = core.handoff.take() {
            core.slot.finish(ticket);
        }
    }
}

/// Marks a handler as running for [`Sequence::state`].
struct ResolvingGuard<'a, S: RequestSet, X: Executor<S>>(&'a Sequence<S, X>);

impl<S: RequestSet, X: Executor<S>> Drop for ResolvingGuard<'_, S, X> {
    fn drop(&mut self) {
        let mut core = self.0.core();
        core.resolving = core.resolving.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequent_core::{Request, request_set};
    use sequent_std::{
        executors::InlineExecutor,
        testing::{ManualExecutor, Observed, RecordingObserver},
    };
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[derive(Debug)]
    struct Ping;

    impl Request for Ping {
        type Output = u8;
    }

    #[derive(Debug)]
    struct Pong;

    impl Request for Pong {
        type Output = u8;
    }

    request_set! {
        enum Signal: SignalKind => SignalOutput {
            Ping(Ping),
            Pong(Pong),
        }
    }

    type Manual = Arc<ManualExecutor<Signal, &'static str>>;

    fn sequence() -> (Manual, Sequence<Signal, Manual>) {
        let executor = Arc::new(ManualExecutor::new());
        (executor.clone(), Sequence::new(executor))
    }

    #[test]
    fn test_states_through_one_request() {
        let (executor, sequence) = sequence();
        sequence.on_success::<Ping>(|_, _| Ok(()));
        assert_eq!(sequence.state(), SequenceState::Idle);

        sequence.attach(Ping).unwrap();
        assert_eq!(sequence.state(), SequenceState::Waiting);
        assert_eq!(sequence.pending_kind(), Some(SignalKind::Ping));

        sequence.start().unwrap();
        assert_eq!(sequence.state(), SequenceState::InFlight);
        assert!(sequence.is_armed());

        executor.succeed_next_as::<Ping>(1).unwrap();
        assert_eq!(sequence.state(), SequenceState::Armed);
        assert_eq!(sequence.pending_kind(), None);
    }

    #[test]
    fn test_state_is_resolving_inside_handler() {
        let (executor, sequence) = sequence();
        let seen = Arc::new(Mutex::new(None));
        let slot = seen.clone();
        sequence.on_success::<Ping>(move |seq, _| {
            *slot.lock().unwrap() = Some(seq.state());
            Ok(())
        });

        sequence.attach(Ping).unwrap();
        sequence.start().unwrap();
        executor.succeed_next_as::<Ping>(0).unwrap();

        assert_eq!(*seen.lock().unwrap(), Some(SequenceState::Resolving));
        assert_eq!(sequence.state(), SequenceState::Armed);
    }

    #[test]
    fn test_start_while_in_flight_submits_nothing() {
        let (executor, sequence) = sequence();
        sequence.attach(Ping).unwrap();
        sequence.start().unwrap();
        sequence.start().unwrap();
        assert_eq!(executor.submitted_count(), 1);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let (executor, sequence) = sequence();
        sequence.on_success::<Ping>(|_, _| Ok(()));
        sequence.attach(Ping).unwrap();
        sequence.start().unwrap();

        let inner = Arc::clone(&sequence.inner);
        let stale = Sequence { inner };
        assert!(stale.resolve(99, Ok(SignalOutput::Ping(0))).is_ok());
        assert_eq!(sequence.state(), SequenceState::InFlight);

        executor.succeed_next_as::<Ping>(0).unwrap();
        assert_eq!(sequence.state(), SequenceState::Armed);
    }

    #[test]
    fn test_output_of_wrong_kind_is_fatal() {
        let (executor, sequence) = sequence();
        sequence.on_success::<Ping>(|_, _| Ok(()));
        sequence.attach(Ping).unwrap();
        sequence.start().unwrap();

        let err = executor.succeed_next_as::<Pong>(0).unwrap_err();
        assert!(matches!(err, SequenceError::OutputMismatch { .. }));
        assert!(err.is_fatal());
        assert_eq!(sequence.pending_kind(), None);
    }

    #[test]
    fn test_clear_default_failure_handler() {
        let (executor, sequence) = sequence();
        sequence.set_default_failure_handler(|_, _| Ok(()));
        assert!(sequence.has_default_failure_handler());
        sequence.clear_default_failure_handler();
        assert!(!sequence.has_default_failure_handler());

        sequence.attach(Pong).unwrap();
        sequence.start().unwrap();
        let err = executor.fail_next("down").unwrap_err();
        assert!(matches!(err, SequenceError::UnhandledFailure { .. }));
    }

    #[test]
    fn test_dropped_sequence_ignores_completion() {
        let (executor, sequence) = sequence();
        sequence.attach(Ping).unwrap();
        sequence.start().unwrap();
        drop(sequence);

        assert!(executor.succeed_next_as::<Ping>(0).is_ok());
    }

    #[test]
    fn test_mismatched_output_is_not_reported_as_success() {
        let executor: Manual = Arc::new(ManualExecutor::new());
        let recorder = RecordingObserver::<SignalKind>::new();
        let sequence = Sequence::builder(executor.clone())
            .on_success::<Ping>(|_, _| Ok(()))
            .observe(recorder.clone())
            .build();

        sequence.attach(Ping).unwrap();
        sequence.start().unwrap();
        assert!(executor.succeed_next_as::<Pong>(0).is_err());

        assert_eq!(recorder.events(), vec![Observed::Dispatched(SignalKind::Ping)]);
    }

    #[test]
    fn test_fold_verdict_prefers_first_then_fatal() {
        let handler = || SequenceError::Handler("boom".into());
        let fatal = || SequenceError::UnhandledSuccess { kind: "Ping".into() };

        assert!(fold_verdict(Ok(()), Ok(())).is_ok());
        assert!(matches!(
            fold_verdict(Ok(()), Err(handler())),
            Err(SequenceError::Handler(_))
        ));
        assert!(matches!(
            fold_verdict(Err(SequenceError::NotReady), Err(handler())),
            Err(SequenceError::NotReady)
        ));
        assert!(matches!(
            fold_verdict(Err(handler()), Err(fatal())),
            Err(SequenceError::UnhandledSuccess { .. })
        ));
        assert!(matches!(
            fold_verdict(Err(fatal()), Err(handler())),
            Err(SequenceError::UnhandledSuccess { .. })
        ));
    }

    #[test]
    fn test_nested_attach_is_queued_for_running_dispatch() {
        let sequence = Sequence::<Signal, _>::new(InlineExecutor::new(|request: Signal| {
            Ok::<_, &'static str>(match request {
                Signal::Ping(_) => SignalOutput::Ping(1),
                Signal::Pong(_) => SignalOutput::Pong(2),
            })
        }));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = seen.clone();
        sequence.on_success::<Ping>(move |seq, _| {
            seq.attach(Pong)?;
            // Not yet submitted: the outer dispatch is still inside `submit`.
            log.lock().unwrap().push(seq.state());
            Ok(())
        });
        sequence.on_success::<Pong>(|_, _| Ok(()));

        sequence.attach(Ping).unwrap();
        sequence.start().unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![SequenceState::InFlight]);
        assert_eq!(sequence.state(), SequenceState::Armed);
    }

    #[test]
    fn test_panicking_handler_releases_dispatch() {
        let sequence = Sequence::<Signal, _>::new(InlineExecutor::new(|request: Signal| {
            Ok::<_, &'static str>(match request {
                Signal::Ping(_) => SignalOutput::Ping(1),
                Signal::Pong(_) => SignalOutput::Pong(2),
            })
        }));
        sequence.on_success::<Ping>(|seq, _| {
            seq.attach(Pong)?;
            panic!("handler bug");
        });
        sequence.on_success::<Pong>(|_, _| Ok(()));

        sequence.attach(Ping).unwrap();
        let outcome = catch_unwind(AssertUnwindSafe(|| sequence.start()));
        assert!(outcome.is_err());

        assert_eq!(sequence.pending_kind(), None);
        sequence.attach(Pong).unwrap();
        assert_eq!(sequence.state(), SequenceState::Armed);
    }
}
