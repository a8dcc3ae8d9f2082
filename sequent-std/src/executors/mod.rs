//! Executor implementations.
//!
//! - [`InlineExecutor`] runs requests synchronously on the caller's stack
//! - `TokioExecutor` runs an async service on a tokio runtime (feature `tokio`)

pub mod inline;
pub mod ready;
#[cfg(feature = "tokio")]
pub mod tokio;

pub use inline::InlineExecutor;
pub use ready::ReadyHandle;
#[cfg(feature = "tokio")]
pub use self::tokio::TokioExecutor;
