use std::sync::{Arc, Mutex, MutexGuard};

use crate::common::data::{Error, RecordedRequest};

/// The ordered log of all requests observed by one tracking initializer.
///
/// Appends and clears are serialized through a single lock, so readers never observe a
/// partially applied append.
#[derive(Debug, Default)]
pub struct RequestHistory {
    requests: Mutex<Vec<Arc<RecordedRequest>>>,
}

impl RequestHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, request: RecordedRequest) {
        let mut requests = self.lock();
        tracing::trace!(
            "Recording request #{}: {} {}",
            requests.len(),
            request.method(),
            request.uri()
        );
        requests.push(Arc::new(request));
    }

    /// Returns a copy of the log in capture order. Later appends do not affect the copy.
    pub fn snapshot(&self) -> Vec<Arc<RecordedRequest>> {
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
        tracing::trace!("Deleted request history");
    }

    /// Serializes the current snapshot as pretty printed JSON.
    pub fn to_json(&self) -> Result<String, Error> {
        let snapshot = self.snapshot();
        let requests: Vec<&RecordedRequest> = snapshot.iter().map(|r| r.as_ref()).collect();
        Ok(serde_json::to_string_pretty(&requests)?)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<RecordedRequest>>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }
}
