//! Asynchronous request services.
//!
//! A [`Service`] performs one request asynchronously. It is what a
//! `TokioExecutor` drives; the executor supplies the runtime and the
//! completion plumbing, the service supplies the work.

use sequent_core::RequestSet;
use std::{fmt::Debug, future::Future};

#[cfg(feature = "tokio")]
pub mod timeout;

#[cfg(feature = "tokio")]
pub use timeout::{TimeoutError, TimeoutService};

/// Performs requests of the set `S`.
///
/// Closures `Fn(S) -> impl Future<Output = Result<S::Output, E>>` implement
/// this trait automatically.
///
/// # Example
///
/// ```rust,ignore
/// struct HttpApi { client: Client }
///
/// impl Service<ApiRequest> for HttpApi {
///     type Error = ApiError;
///
///     async fn call(&self, request: ApiRequest) -> Result<ApiOutput, ApiError> {
///         match request {
///             ApiRequest::FetchProfile(req) => Ok(ApiOutput::FetchProfile(self.profile(req).await?)),
///             ApiRequest::FetchScore(req) => Ok(ApiOutput::FetchScore(self.score(req).await?)),
///         }
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot serve requests of `{S}`",
    label = "missing `Service<{S}>` implementation",
    note = "Services must implement `call` for the request set `{S}`."
)]
pub trait Service<S: RequestSet>: Send + Sync + 'static {
    /// The failure a request can resolve with.
    type Error: Debug + Send + 'static;

    /// Perform the request.
    fn call(&self, request: S) -> impl Future<Output = Result<S::Output, Self::Error>> + Send;
}

// Blanket impl for closures
impl<S, F, Fut, E> Service<S> for F
where
    S: RequestSet,
    F: Fn(S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<S::Output, E>> + Send,
    E: Debug + Send + 'static,
{
    type Error = E;

    fn call(&self, request: S) -> impl Future<Output = Result<S::Output, Self::Error>> + Send {
        (self)(request)
    }
}
