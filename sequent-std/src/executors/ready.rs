//! Runtime readiness gate shared between an executor and its owner.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

const UNLIMITED: usize = usize::MAX;

#[derive(Debug)]
struct Gate {
    paused: AtomicBool,
    budget: AtomicUsize,
}

/// Controls whether an executor accepts work.
///
/// Clones share the same gate. An executor that is paused, or has used up its
/// submission budget, reports `is_ready() == false`, which makes
/// `Sequence::start` and armed attaches fail with `ExecutorUnavailable` while
/// leaving the request attached.
///
/// # Example
///
/// ```rust,ignore
/// let ready = executor.ready_handle();
///
/// // Let the current page through, then stop the chain before the next one.
/// ready.limit(1);
/// sequence.start()?;
/// ```
#[derive(Debug, Clone)]
pub struct ReadyHandle(Arc<Gate>);

impl ReadyHandle {
    /// A gate that accepts work without limit.
    pub fn new() -> Self {
        Self(Arc::new(Gate {
            paused: AtomicBool::new(false),
            budget: AtomicUsize::new(UNLIMITED),
        }))
    }

    /// A gate that starts paused.
    pub fn paused() -> Self {
        let handle = Self::new();
        handle.pause();
        handle
    }

    /// Whether the executor accepts a submission right now.
    pub fn is_ready(&self) -> bool {
        !self.0.paused.load(Ordering::Acquire) && self.0.budget.load(Ordering::Acquire) > 0
    }

    /// Stop accepting work.
    pub fn pause(&self) {
        self.0.paused.store(true, Ordering::Release);
    }

    /// Accept work again. The submission budget is left as it is.
    pub fn resume(&self) {
        self.0.paused.store(false, Ordering::Release);
    }

    /// Accept `submissions` more requests, then report not ready.
    pub fn limit(&self, submissions: usize) {
        self.0.budget.store(submissions.min(UNLIMITED - 1), Ordering::Release);
    }

    /// Remove the submission budget.
    pub fn unlimited(&self) {
        self.0.budget.store(UNLIMITED, Ordering::Release);
    }

    /// Submissions left before the budget runs out, if one is set.
    pub fn remaining(&self) -> Option<usize> {
        match self.0.budget.load(Ordering::Acquire) {
            UNLIMITED => None,
            left => Some(left),
        }
    }

    /// Record one accepted submission against the budget.
    pub(crate) fn admit(&self) {
        let _ = self
            .0
            .budget
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| match left {
                UNLIMITED | 0 => None,
                left => Some(left - 1),
            });
    }
}

impl Default for ReadyHandle {
    fn default() -> Self {
        Self::new()
    }
}
