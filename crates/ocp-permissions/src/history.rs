//! In-memory log of permission requests, used to resolve replies by id.

use ocp_types::PermissionRequest;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// Ordered log of `permission.asked` events seen by this process.
///
/// Unbounded unless created with [`PermissionHistory::with_limit`], in which
/// case the oldest requests are evicted first. Nothing is persisted: a reply
/// to a request asked before the process started can't be resolved.
#[derive(Debug, Default)]
pub struct PermissionHistory {
    entries: Mutex<VecDeque<PermissionRequest>>,
    limit: Option<usize>,
}

impl PermissionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` requests.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(limit.min(64))),
            limit: Some(limit),
        }
    }

    /// Append a request. Duplicates are kept.
    pub fn record(&self, request: PermissionRequest) {
        let mut entries = self.lock();
        entries.push_back(request);
        if let Some(limit) = self.limit {
            while entries.len() > limit {
                if let Some(evicted) = entries.pop_front() {
                    tracing::debug!("Evicted permission request {} from history", evicted.id);
                }
            }
        }
    }

    /// The oldest recorded request with the given id.
    pub fn find(&self, id: &str) -> Option<PermissionRequest> {
        self.lock().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<PermissionRequest>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
