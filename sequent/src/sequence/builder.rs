use super::{HandlerResult, Sequence, handlers, handlers::HandlerRegistry};
use sequent_core::{Executor, Member, Observer, RequestSet};
use std::sync::Arc;

/// Builder for a [`Sequence`] with its handlers and observers in place.
///
/// Observers can only be added here; handlers can also be registered on the
/// built sequence.
///
/// # Example
///
/// ```rust,ignore
/// let sequence = SequenceBuilder::new(executor)
///     .on_success::<FetchProfile>(|seq, profile| {
///         seq.attach(FetchScore { user_id: profile.id })?;
///         Ok(())
///     })
///     .on_success::<FetchScore>(|_, _| Ok(()))
///     .default_failure(|_, error| {
///         eprintln!("{error:?}");
///         Ok(())
///     })
///     .observe(LoggingObserver::new())
///     .build();
/// ```
pub struct SequenceBuilder<S: RequestSet, X: Executor<S>> {
    executor: X,
    handlers: HandlerRegistry<S, X>,
    observers: Vec<Arc<dyn Observer<S, X::Error>>>,
}

impl<S: RequestSet, X: Executor<S>> SequenceBuilder<S, X> {
    /// Start from an executor with no handlers and no observers.
    pub fn new(executor: X) -> Self {
        Self {
            executor,
            handlers: HandlerRegistry::new(),
            observers: Vec::new(),
        }
    }

    /// Register the success handler for request type `M`.
    pub fn on_success<M: Member<S>>(
        mut self,
        handler: impl Fn(&Sequence<S, X>, M::Output) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        self.handlers
            .set_success(M::KIND, handlers::typed_success::<S, X, M, _>(handler));
        self
    }

    /// Register the success handler for `kind`.
    pub fn register_success_handler(
        mut self,
        kind: S::Kind,
        handler: impl Fn(&Sequence<S, X>, S::Output) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        self.handlers
            .set_success(kind, handlers::raw_success(handler));
        self
    }

    /// Register the failure handler for request type `M`.
    pub fn on_failure<M: Member<S>>(
        self,
        handler: impl Fn(&Sequence<S, X>, X::Error) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        self.register_failure_handler(M::KIND, handler)
    }

    /// Register the failure handler for `kind`.
    pub fn register_failure_handler(
        mut self,
        kind: S::Kind,
        handler: impl Fn(&Sequence<S, X>, X::Error) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        self.handlers.set_failure(kind, handlers::failure(handler));
        self
    }

    /// Set the default failure handler.
    pub fn default_failure(
        mut self,
        handler: impl Fn(&Sequence<S, X>, X::Error) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        self.handlers
            .set_default_failure(Some(handlers::failure(handler)));
        self
    }

    /// Add an observer. Observers are notified in the order they were added.
    pub fn observe<O: Observer<S, X::Error>>(mut self, observer: O) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Build the sequence.
    pub fn build(self) -> Sequence<S, X> {
        Sequence::from_parts(self.executor, self.handlers, self.observers)
    }
}
