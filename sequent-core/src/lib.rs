//! # sequent-core
//!
//! Core traits for the Sequent request sequencer.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! executors and observers that don't need the coordinator itself.
//!
//! # Building Blocks
//!
//! ## Units of work ([`Request`], [`RequestSet`], [`Member`])
//!
//! A request is one asynchronous operation with a typed output. Requests that
//! share a sequence form a closed set whose fieldless kind enum is the key
//! success and failure handlers are registered under. [`request_set!`] declares
//! a set in one place.
//!
//! ## Execution ([`Executor`], [`Completion`])
//!
//! The executor performs the work. It receives one request plus a completion
//! callback and resolves that callback exactly once.
//!
//! ## Diagnostics ([`Observer`])
//!
//! A side channel that sees dispatches and resolutions without affecting them.
//!
//! # Error Types
//!
//! - [`SequenceError`] - misuse of a sequence and fatal resolutions
//! - [`BoxError`] - errors returned by handlers

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod executor;
mod observer;
mod request;

// Re-exports
pub use error::{BoxError, SequenceError};
pub use executor::{Completion, Executor};
pub use observer::Observer;
pub use request::{Member, Request, RequestSet};
