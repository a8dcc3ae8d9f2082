//! The pending slot and the observable lifecycle states.

use sequent_core::RequestSet;
use std::{fmt, mem};

/// Where a sequence is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    /// Nothing attached, not started.
    Idle,
    /// A request is attached and waits for `start`.
    Waiting,
    /// Started, nothing attached; the next `attach` dispatches immediately.
    Armed,
    /// A request was handed to the executor and has not resolved yet.
    InFlight,
    /// A request resolved and its handler is running.
    Resolving,
}

impl fmt::Display for SequenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceState::Idle => write!(f, "idle"),
            SequenceState::Waiting => write!(f, "waiting"),
            SequenceState::Armed => write!(f, "armed"),
            SequenceState::InFlight => write!(f, "in_flight"),
            SequenceState::Resolving => write!(f, "resolving"),
        }
    }
}

/// The single pending-request slot.
///
/// The request itself is owned while it waits; once handed to the executor
/// only its kind and a ticket remain, which is what keeps the slot occupied
/// until the completion for that ticket arrives.
pub(crate) enum Slot<S: RequestSet> {
    Empty,
    Waiting(S),
    InFlight { kind: S::Kind, ticket: u64 },
}

impl<S: RequestSet> Slot<S> {
    /// Kind of the occupying request, if any.
    pub(crate) fn kind(&self) -> Option<S::Kind> {
        match self {
            Slot::Empty => None,
            Slot::Waiting(request) => Some(request.kind()),
            Slot::InFlight { kind, .. } => Some(*kind),
        }
    }

    /// Take a waiting request out for dispatch, leaving the slot in flight.
    pub(crate) fn launch(&mut self, ticket: u64) -> Option<S> {
        match mem::replace(self, Slot::Empty) {
            Slot::Waiting(request) => {
                *self = Slot::InFlight {
                    kind: request.kind(),
                    ticket,
                };
                Some(request)
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// Clear the slot if it holds the in-flight request for `ticket`.
    pub(crate) fn finish(&mut self, ticket: u64) -> Option<S::Kind> {
        match *self {
            Slot::InFlight { kind, ticket: current } if current == ticket => {
                *self = Slot::Empty;
                Some(kind)
            }
            _ => None,
        }
    }
}
