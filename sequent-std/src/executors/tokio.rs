//! Tokio-backed executor.

use super::ready::ReadyHandle;
use crate::service::Service;
use sequent_core::{Completion, Executor, RequestSet, SequenceError};
use std::sync::Arc;
use tokio::runtime::Handle;

/// An executor that runs a [`Service`] on a tokio runtime.
///
/// Every submitted request is spawned as its own task. The completion is
/// resolved on that task, so handlers run on a runtime worker thread.
///
/// The executor is ready only when a runtime handle is available and its
/// [`ReadyHandle`] is neither paused nor out of budget.
///
/// A verdict cannot be returned to the caller that attached the request,
/// because that call finished long ago. A fatal verdict (an unhandled success
/// or failure, or an output of the wrong kind) is logged and the resolving
/// task panics. Any other error, such as one returned by a handler, is only
/// logged.
///
/// # Example
///
/// ```rust,ignore
/// let executor = TokioExecutor::new(HttpApi::new(client));
/// let sequence = Sequence::new(executor);
/// ```
pub struct TokioExecutor<Svc> {
    service: Arc<Svc>,
    handle: Option<Handle>,
    ready: ReadyHandle,
}

impl<Svc> TokioExecutor<Svc> {
    /// Create an executor on the runtime the caller is running in.
    ///
    /// Outside a runtime the executor is never ready.
    pub fn new(service: Svc) -> Self {
        Self::from_parts(service, Handle::try_current().ok())
    }

    /// Create an executor that spawns onto a specific runtime.
    pub fn with_handle(service: Svc, handle: Handle) -> Self {
        Self::from_parts(service, Some(handle))
    }

    fn from_parts(service: Svc, handle: Option<Handle>) -> Self {
        Self {
            service: Arc::new(service),
            handle,
            ready: ReadyHandle::default(),
        }
    }

    /// Get a handle for pausing the executor.
    pub fn ready_handle(&self) -> ReadyHandle {
        self.ready.clone()
    }

    /// Get the wrapped service.
    pub fn service(&self) -> &Svc {
        &self.service
    }
}

impl<S, Svc> Executor<S> for TokioExecutor<Svc>
where
    S: RequestSet,
    Svc: Service<S>,
{
    type Error = Svc::Error;

    fn is_ready(&self) -> bool {
        self.handle.is_some() && self.ready.is_ready()
    }

    fn submit(
        &self,
        request: S,
        completion: Completion<S::Output, Svc::Error>,
    ) -> Result<(), SequenceError> {
        let Some(handle) = &self.handle else {
            return Err(SequenceError::ExecutorUnavailable);
        };
        self.ready.admit();

        let service = Arc::clone(&self.service);
        handle.spawn(async move {
            let result = service.call(request).await;
            match completion.complete(result) {
                Ok(()) => {}
                Err(err) if err.is_fatal() => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(error = %err, "request resolution failed");
                    panic!("request resolution failed: {err}");
                }
                Err(_err) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(error = %_err, "handler failed");
                }
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sequent_core::{Request, request_set};
    use tokio::sync::oneshot;

    #[derive(Debug)]
    struct Echo(String);

    impl Request for Echo {
        type Output = String;
    }

    request_set! {
        enum EchoRequest: EchoKind => EchoOutput {
            Echo(Echo),
        }
    }

    async fn echo(request: EchoRequest) -> Result<EchoOutput, String> {
        let EchoRequest::Echo(Echo(text)) = request;
        tokio::task::yield_now().await;
        Ok(EchoOutput::Echo(text))
    }

    #[tokio::test]
    async fn test_spawns_and_completes() {
        let executor = TokioExecutor::new(echo);
        assert!(Executor::<EchoRequest>::is_ready(&executor));

        let (tx, rx) = oneshot::channel();
        let completion = Completion::new(move |result: Result<EchoOutput, String>| {
            let _ = tx.send(result);
            Ok(())
        });

        executor
            .submit(EchoRequest::Echo(Echo("hi".into())), completion)
            .unwrap();

        let EchoOutput::Echo(text) = rx.await.unwrap().unwrap();
        assert_eq!(text, "hi");
    }

    #[test]
    fn test_not_ready_outside_runtime() {
        let executor = TokioExecutor::new(echo);
        assert!(!Executor::<EchoRequest>::is_ready(&executor));

        let completion = Completion::new(|_: Result<EchoOutput, String>| Ok(()));
        let verdict = executor.submit(EchoRequest::Echo(Echo("lost".into())), completion);
        assert!(matches!(verdict, Err(SequenceError::ExecutorUnavailable)));
    }

    #[tokio::test]
    async fn test_paused_executor_is_not_ready() {
        let executor = TokioExecutor::new(echo);
        executor.ready_handle().pause();
        assert!(!Executor::<EchoRequest>::is_ready(&executor));
    }
}
