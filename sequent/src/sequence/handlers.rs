//! Per-kind handler storage.

use super::Sequence;
use sequent_core::{BoxError, Executor, Member, RequestSet, SequenceError};
use std::{collections::HashMap, sync::Arc};

/// What a success or failure handler returns.
///
/// Handlers can use `?` on nested [`Sequence::attach`] calls and on their own
/// errors. A [`SequenceError`] returned this way keeps its variant when it
/// propagates; anything else is wrapped in [`SequenceError::Handler`].
pub type HandlerResult = Result<(), BoxError>;

pub(crate) type SuccessFn<S, X> = Arc<
    dyn Fn(&Sequence<S, X>, <S as RequestSet>::Output) -> Result<(), SequenceError>
        + Send
        + Sync,
>;

pub(crate) type FailureFn<S, X> = Arc<
    dyn Fn(&Sequence<S, X>, <X as Executor<S>>::Error) -> Result<(), SequenceError>
        + Send
        + Sync,
>;

/// Turn a handler's result into the sequence's verdict.
pub(crate) fn settle(result: HandlerResult) -> Result<(), SequenceError> {
    result.map_err(|err| match err.downcast::<SequenceError>() {
        Ok(err) => *err,
        Err(err) => SequenceError::Handler(err),
    })
}

pub(crate) fn raw_success<S, X, F>(handler: F) -> SuccessFn<S, X>
where
    S: RequestSet,
    X: Executor<S>,
    F: Fn(&Sequence<S, X>, S::Output) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(move |sequence: &Sequence<S, X>, output: S::Output| {
        settle(handler(sequence, output))
    })
}

/// Wrap a handler for one member's typed output.
///
/// Only called with outputs whose kind is `M::KIND`.
pub(crate) fn typed_success<S, X, M, F>(handler: F) -> SuccessFn<S, X>
where
    S: RequestSet,
    X: Executor<S>,
    M: Member<S>,
    F: Fn(&Sequence<S, X>, M::Output) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(move |sequence: &Sequence<S, X>, output: S::Output| {
        match M::from_output(output) {
            Some(output) => settle(handler(sequence, output)),
            // Resolution rejects outputs of another kind before looking up handlers.
            None => unreachable!("typed handler for {:?} received another output", M::KIND),
        }
    })
}

pub(crate) fn failure<S, X, F>(handler: F) -> FailureFn<S, X>
where
    S: RequestSet,
    X: Executor<S>,
    F: Fn(&Sequence<S, X>, X::Error) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(move |sequence: &Sequence<S, X>, error: X::Error| {
        settle(handler(sequence, error))
    })
}

/// Success and failure handlers keyed by request kind.
///
/// Registering a kind twice replaces the earlier handler.
pub(crate) struct HandlerRegistry<S: RequestSet, X: Executor<S>> {
    success: HashMap<S::Kind, SuccessFn<S, X>>,
    failure: HashMap<S::Kind, FailureFn<S, X>>,
    default_failure: Option<FailureFn<S, X>>,
}

impl<S: RequestSet, X: Executor<S>> HandlerRegistry<S, X> {
    pub(crate) fn new() -> Self {
        Self {
            success: HashMap::new(),
            failure: HashMap::new(),
            default_failure: None,
        }
    }

    pub(crate) fn set_success(&mut self, kind: S::Kind, handler: SuccessFn<S, X>) {
        self.success.insert(kind, handler);
    }

    pub(crate) fn set_failure(&mut self, kind: S::Kind, handler: FailureFn<S, X>) {
        self.failure.insert(kind, handler);
    }

    pub(crate) fn set_default_failure(&mut self, handler: Option<FailureFn<S, X>>) {
        self.default_failure = handler;
    }

    pub(crate) fn success(&self, kind: S::Kind) -> Option<SuccessFn<S, X>> {
        self.success.get(&kind).cloned()
    }

    pub(crate) fn failure(&self, kind: S::Kind) -> Option<FailureFn<S, X>> {
        self.failure.get(&kind).cloned()
    }

    pub(crate) fn default_failure(&self) -> Option<FailureFn<S, X>> {
        self.default_failure.clone()
    }

    pub(crate) fn has_success(&self, kind: S::Kind) -> bool {
        self.success.contains_key(&kind)
    }

    pub(crate) fn has_failure(&self, kind: S::Kind) -> bool {
        self.failure.contains_key(&kind)
    }

    pub(crate) fn has_default_failure(&self) -> bool {
        self.default_failure.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("quota exceeded")]
    struct QuotaExceeded;

    #[test]
    fn test_settle_keeps_sequence_errors() {
        let result: HandlerResult = Err(Box::new(SequenceError::NotReady));
        assert!(matches!(settle(result), Err(SequenceError::NotReady)));
    }

    #[test]
    fn test_settle_wraps_foreign_errors() {
        let result: HandlerResult = Err(Box::new(QuotaExceeded));
        let err = settle(result).unwrap_err();
        assert!(matches!(err, SequenceError::Handler(_)));
        assert_eq!(err.to_string(), "handler error: quota exceeded");
    }

    #[test]
    fn test_settle_ok() {
        assert!(settle(Ok(())).is_ok());
    }
}
