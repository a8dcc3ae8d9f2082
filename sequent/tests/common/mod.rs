#![allow(dead_code)]

use sequent::{Request, Sequence, request_set, testing::ManualExecutor};
use std::sync::{Arc, Mutex};

// ============================================================================
// Test Request Types
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Profile {
    pub id: u64,
    pub name: String,
}

#[derive(Debug)]
pub struct FetchProfile {
    pub user_id: u64,
}

impl Request for FetchProfile {
    type Output = Profile;
}

#[derive(Debug)]
pub struct FetchScore {
    pub user_id: u64,
}

impl Request for FetchScore {
    type Output = u32;
}

#[derive(Debug)]
pub struct Publish {
    pub score: u32,
}

impl Request for Publish {
    type Output = ();
}

request_set! {
    pub enum ApiRequest: ApiKind => ApiOutput {
        FetchProfile(FetchProfile),
        FetchScore(FetchScore),
        Publish(Publish),
    }
}

// ============================================================================
// Test Errors
// ============================================================================

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("network timeout")]
    NetworkTimeout,
    #[error("not found: {0}")]
    NotFound(u64),
}

// ============================================================================
// Helpers
// ============================================================================

pub type Manual = Arc<ManualExecutor<ApiRequest, ApiError>>;

pub type ApiSequence = Sequence<ApiRequest, Manual>;

pub fn manual() -> Manual {
    Arc::new(ManualExecutor::new())
}

pub fn profile(id: u64) -> Profile {
    Profile {
        id,
        name: format!("user-{id}"),
    }
}

/// A shared log handlers push into.
#[derive(Clone, Default)]
pub struct Log<T> {
    entries: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone> Log<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self, entry: T) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<T> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}
