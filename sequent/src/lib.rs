//! # sequent - Single-Flight Request Sequencing
//!
//! `sequent` runs a chain of dependent asynchronous requests strictly one at a
//! time. Each request's result is routed to the handler registered for its
//! kind, and handlers decide what runs next by attaching the following request.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sequent::prelude::*;
//!
//! #[derive(Debug)]
//! struct FetchProfile { user_id: u64 }
//! impl Request for FetchProfile { type Output = Profile; }
//!
//! #[derive(Debug)]
//! struct FetchScore { user_id: u64 }
//! impl Request for FetchScore { type Output = u32; }
//!
//! request_set! {
//!     pub enum ApiRequest: ApiKind => ApiOutput {
//!         FetchProfile(FetchProfile),
//!         FetchScore(FetchScore),
//!     }
//! }
//!
//! let sequence = Sequence::builder(executor)
//!     .on_success::<FetchProfile>(|seq, profile| {
//!         seq.attach(FetchScore { user_id: profile.id })?;
//!         Ok(())
//!     })
//!     .on_success::<FetchScore>(|_, score| {
//!         println!("score: {score}");
//!         Ok(())
//!     })
//!     .build();
//!
//! sequence.attach(FetchProfile { user_id: 7 })?;
//! sequence.start()?;
//! ```
//!
//! ## Executors
//!
//! The sequence never performs work itself. An [`Executor`] does:
//! - [`executors::InlineExecutor`] runs a closure inside `submit`
//! - `executors::TokioExecutor` (feature `tokio`) spawns a [`service::Service`] onto a runtime
//! - [`testing::ManualExecutor`] holds submissions until a test resolves them

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod sequence;

pub use sequence::{HandlerResult, Sequence, SequenceBuilder, SequenceState};

pub use sequent_core::{
    BoxError, Completion, Executor, Member, Observer, Request, RequestSet, SequenceError,
    request_set,
};

/// Executors that perform requests.
pub mod executors {
    #![allow(clippy::wildcard_imports)]
    pub use sequent_std::executors::*;
}

/// Standard observers.
pub mod observers {
    #![allow(clippy::wildcard_imports)]
    pub use sequent_std::observers::*;
}

/// Async request services.
pub mod service {
    #![allow(clippy::wildcard_imports)]
    pub use sequent_std::service::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use sequent_std::testing::*;
}

/// Prelude module - common imports for Sequent.
///
/// # Usage
///
/// ```rust,ignore
/// use sequent::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, Executor, HandlerResult, Member, Observer, Request, RequestSet, Sequence,
        SequenceBuilder, SequenceError, SequenceState, request_set,
    };
}

#[cfg(feature = "macros")]
pub use sequent_macros::Request;
