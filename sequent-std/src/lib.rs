//! # sequent-std
//!
//! Standard collaborators for the Sequent request sequencer.
//!
//! This crate provides:
//! - **Executors**: [`InlineExecutor`](executors::InlineExecutor), `TokioExecutor` (feature `tokio`)
//! - **Services**: the [`Service`](service::Service) trait, `TimeoutService` (feature `tokio`)
//! - **Observers**: [`LoggingObserver`](observers::LoggingObserver)
//! - **Testing**: [`ManualExecutor`](testing::ManualExecutor), [`RecordingObserver`](testing::RecordingObserver)

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use sequent_core;

// Modules
pub mod executors;
pub mod observers;
pub mod service;
pub mod testing;
