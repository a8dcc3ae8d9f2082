//! End-to-end sequences on a tokio runtime.

use sequent::{Sequence, SequenceState, service::Service};
use sequent_std::{
    executors::TokioExecutor,
    service::{TimeoutError, TimeoutService},
};
use std::{
    sync::{
        Once,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;

mod common;
use common::{ApiError, ApiOutput, ApiRequest, FetchProfile, FetchScore, Publish, profile};

impl From<TimeoutError> for ApiError {
    fn from(_: TimeoutError) -> Self {
        ApiError::NetworkTimeout
    }
}

/// Answers every request after `latency`.
struct FakeApi {
    latency: Duration,
}

impl Service<ApiRequest> for FakeApi {
    type Error = ApiError;

    async fn call(&self, request: ApiRequest) -> Result<ApiOutput, ApiError> {
        tokio::time::sleep(self.latency).await;
        match request {
            ApiRequest::FetchProfile(FetchProfile { user_id }) => {
                Ok(ApiOutput::FetchProfile(profile(user_id)))
            }
            ApiRequest::FetchScore(FetchScore { user_id }) => {
                Ok(ApiOutput::FetchScore(user_id as u32 + 1))
            }
            ApiRequest::Publish(_) => Ok(ApiOutput::Publish(())),
        }
    }
}

#[tokio::test]
async fn test_chain_on_runtime() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let executor = TokioExecutor::new(FakeApi {
        latency: Duration::from_millis(1),
    });

    let sequence = Sequence::<ApiRequest, _>::builder(executor)
        .on_success::<FetchProfile>(|seq, profile| {
            seq.attach(FetchScore { user_id: profile.id })?;
            Ok(())
        })
        .on_success::<FetchScore>(|seq, score| {
            seq.attach(Publish { score })?;
            Ok(())
        })
        .on_success::<Publish>(move |_, ()| {
            tx.send("published").unwrap();
            Ok(())
        })
        .build();

    sequence.attach(FetchProfile { user_id: 41 }).unwrap();
    sequence.start().unwrap();
    assert_eq!(sequence.state(), SequenceState::InFlight);

    assert_eq!(rx.recv().await, Some("published"));
    assert_eq!(sequence.state(), SequenceState::Armed);
}

#[tokio::test]
async fn test_closure_service() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let executor = TokioExecutor::new(|request: ApiRequest| async move {
        match request {
            ApiRequest::FetchScore(FetchScore { user_id }) => {
                Ok(ApiOutput::FetchScore(user_id as u32))
            }
            _ => Err(ApiError::NotFound(0)),
        }
    });

    let sequence = Sequence::<ApiRequest, _>::new(executor);
    sequence.on_success::<FetchScore>(move |_, score| {
        tx.send(score).unwrap();
        Ok(())
    });

    sequence.attach(FetchScore { user_id: 9 }).unwrap();
    sequence.start().unwrap();
    assert_eq!(rx.recv().await, Some(9));
}

#[tokio::test]
async fn test_timeout_routes_to_failure_handler() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let executor = TokioExecutor::new(TimeoutService::new(
        FakeApi {
            latency: Duration::from_secs(5),
        },
        Duration::from_millis(10),
    ));

    let sequence = Sequence::<ApiRequest, _>::new(executor);
    sequence.set_default_failure_handler(move |_, error| {
        tx.send(error).unwrap();
        Ok(())
    });

    sequence.attach(FetchProfile { user_id: 1 }).unwrap();
    sequence.start().unwrap();

    assert_eq!(rx.recv().await, Some(ApiError::NetworkTimeout));
    assert_eq!(sequence.pending_kind(), None);
}

static HANDLER_ERROR_PANICS: AtomicUsize = AtomicUsize::new(0);

fn count_handler_error_panics() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if info.to_string().contains("not found: 77") {
                HANDLER_ERROR_PANICS.fetch_add(1, Ordering::SeqCst);
            }
            previous(info);
        }));
    });
}

#[tokio::test]
async fn test_handler_error_does_not_panic_task() {
    count_handler_error_panics();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let executor = TokioExecutor::new(FakeApi {
        latency: Duration::from_millis(1),
    });

    let sequence = Sequence::<ApiRequest, _>::new(executor);
    let failed = tx.clone();
    sequence.on_success::<FetchScore>(move |_, _| {
        failed.send("score").unwrap();
        Err(ApiError::NotFound(77).into())
    });
    sequence.on_success::<Publish>(move |_, ()| {
        tx.send("published").unwrap();
        Ok(())
    });

    sequence.attach(FetchScore { user_id: 1 }).unwrap();
    sequence.start().unwrap();
    assert_eq!(rx.recv().await, Some("score"));

    // The resolving task finished without panicking and the sequence moves on.
    sequence.attach(Publish { score: 2 }).unwrap();
    assert_eq!(rx.recv().await, Some("published"));
    assert_eq!(HANDLER_ERROR_PANICS.load(Ordering::SeqCst), 0);
    assert_eq!(sequence.state(), SequenceState::Armed);
}

#[test]
fn test_start_outside_runtime_is_unavailable() {
    let executor = TokioExecutor::new(FakeApi {
        latency: Duration::ZERO,
    });
    let sequence = Sequence::<ApiRequest, _>::new(executor);

    sequence.attach(FetchProfile { user_id: 1 }).unwrap();
    assert!(matches!(
        sequence.start(),
        Err(sequent::SequenceError::ExecutorUnavailable)
    ));
    assert_eq!(sequence.state(), SequenceState::Waiting);
}
