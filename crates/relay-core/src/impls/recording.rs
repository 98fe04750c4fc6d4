//! RecordingExecutor - 開発・テスト用の HttpExecutor
//!
//! ネットワークには出ず、execute() の呼び出しを順番に記録するだけです。

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::ports::HttpExecutor;

/// One call received by [`RecordingExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedRequest {
    pub method: String,
    pub url: String,
    pub timeout: Duration,
}

#[derive(Debug, Default)]
pub struct RecordingExecutor {
    requests: Mutex<Vec<ExecutedRequest>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far, oldest first.
    pub fn requests(&self) -> Vec<ExecutedRequest> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ExecutedRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HttpExecutor for RecordingExecutor {
    fn execute(&self, method: &str, url: &str, timeout: Duration) {
        self.lock().push(ExecutedRequest {
            method: method.to_string(),
            url: url.to_string(),
            timeout,
        });
    }
}
