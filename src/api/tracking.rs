use bytes::Bytes;
use http::Request;
use std::{fmt, sync::Arc};

use crate::{
    api::hooks::{HttpExecuteInterceptor, HttpRequestInitializer, PendingRequest},
    common::data::{Error, RecordedRequest},
    recorder::{render, RequestHistory},
};

/// An [HttpRequestInitializer] that records every request right before it is executed.
///
/// Each instance owns its own history, so independent tests never share recorded state.
/// An optional delegate initializer runs first on every request, and any execute interceptor
/// it (or anybody else) installed keeps running ahead of the recording step.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use storage_tracking::prelude::*;
///
/// let tracker = Arc::new(TrackingInitializer::new());
/// let client = InterceptingClient::new(HyperHttpClient::default(), tracker.clone());
/// // ... run code under test with `client` ...
/// assert!(tracker.get_all_request_strings().is_empty());
/// ```
pub struct TrackingInitializer {
    delegate: Option<Arc<dyn HttpRequestInitializer>>,
    history: Arc<RequestHistory>,
}

impl TrackingInitializer {
    pub fn new() -> Self {
        Self {
            delegate: None,
            history: Arc::new(RequestHistory::new()),
        }
    }

    /// Creates a tracking initializer that calls `delegate` before installing its own hook.
    pub fn with_delegate(delegate: Arc<dyn HttpRequestInitializer>) -> Self {
        Self {
            delegate: Some(delegate),
            history: Arc::new(RequestHistory::new()),
        }
    }

    /// All recorded requests in capture order.
    pub fn get_all_requests(&self) -> Vec<Arc<RecordedRequest>> {
        self.history.snapshot()
    }

    /// All recorded requests rendered as canonical strings with pagination and generation
    /// match tokens replaced by sequential placeholders.
    pub fn get_all_request_strings(&self) -> Vec<String> {
        render(&self.history.snapshot())
    }

    pub fn export_json(&self) -> Result<String, Error> {
        self.history.to_json()
    }

    pub fn reset(&self) {
        tracing::debug!("Resetting tracked requests");
        self.history.clear();
    }
}

impl Default for TrackingInitializer {
    fn default() -> Self {
        TrackingInitializer::new()
    }
}

impl fmt::Debug for TrackingInitializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingInitializer")
            .field("has_delegate", &self.delegate.is_some())
            .field("recorded", &self.history.len())
            .finish()
    }
}

impl HttpRequestInitializer for TrackingInitializer {
    fn initialize(&self, request: &mut PendingRequest) -> Result<(), Error> {
        if let Some(delegate) = &self.delegate {
            delegate.initialize(request)?;
        }

        tracing::debug!(
            "Installing tracking interceptor for {} {}",
            request.method(),
            request.uri()
        );

        let interceptor = TrackingInterceptor {
            previous: request.interceptor(),
            history: self.history.clone(),
        };
        request.set_interceptor(Arc::new(interceptor));

        Ok(())
    }
}

struct TrackingInterceptor {
    previous: Option<Arc<dyn HttpExecuteInterceptor>>,
    history: Arc<RequestHistory>,
}

impl HttpExecuteInterceptor for TrackingInterceptor {
    fn intercept(&self, request: &mut Request<Bytes>) -> Result<(), Error> {
        if let Some(previous) = &self.previous {
            previous.intercept(request)?;
        }
        self.history.append(RecordedRequest::from(&*request));
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::TrackingInitializer;
    use crate::{
        api::hooks::{HttpExecuteInterceptor, HttpRequestInitializer, PendingRequest},
        common::data::Error,
    };
    use bytes::Bytes;
    use http::Request;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn pending(uri: &str) -> PendingRequest {
        PendingRequest::new(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Bytes::new())
                .unwrap(),
        )
    }

    fn execute(request: PendingRequest) -> Result<(), Error> {
        let (mut request, interceptor) = request.into_parts();
        match interceptor {
            Some(interceptor) => interceptor.intercept(&mut request),
            None => Ok(()),
        }
    }

    #[test]
    fn records_only_when_executed() {
        let tracker = TrackingInitializer::new();
        let mut req = pending("https://www.googleapis.com/storage/v1/b/bucket");

        tracker.initialize(&mut req).unwrap();
        assert!(tracker.get_all_requests().is_empty());

        execute(req).unwrap();
        assert_eq!(
            tracker.get_all_request_strings(),
            vec!["GET:https://www.googleapis.com/storage/v1/b/bucket"]
        );

        tracker.reset();
        assert!(tracker.get_all_requests().is_empty());
        assert!(tracker.get_all_request_strings().is_empty());
    }

    #[test]
    fn runs_delegate_and_existing_interceptor_first() {
        let calls = Arc::new(AtomicUsize::new(0));

        let delegate_calls = calls.clone();
        let delegate = move |req: &mut PendingRequest| -> Result<(), Error> {
            req.headers_mut()
                .insert("authorization", "Bearer token".parse().unwrap());
            let interceptor_calls = delegate_calls.clone();
            let interceptor = move |req: &mut Request<Bytes>| -> Result<(), Error> {
                interceptor_calls.fetch_add(1, Ordering::SeqCst);
                req.headers_mut()
                    .insert("x-signed", "yes".parse().unwrap());
                Ok(())
            };
            req.set_interceptor(Arc::new(interceptor));
            Ok(())
        };

        let tracker = TrackingInitializer::with_delegate(Arc::new(delegate));
        let mut req = pending("https://www.googleapis.com/storage/v1/b/bucket");
        tracker.initialize(&mut req).unwrap();
        execute(req).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let recorded = tracker.get_all_requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].header("authorization"), Some("Bearer token"));
        assert_eq!(recorded[0].header("x-signed"), Some("yes"));
    }

    #[test]
    fn delegate_failure_propagates_and_records_nothing() {
        let delegate = |_: &mut PendingRequest| -> Result<(), Error> {
            Err(Error::InitializerError("no credentials".to_string()))
        };

        let tracker = TrackingInitializer::with_delegate(Arc::new(delegate));
        let mut req = pending("https://www.googleapis.com/storage/v1/b/bucket");

        let err = tracker.initialize(&mut req).unwrap_err();
        assert!(matches!(err, Error::InitializerError(msg) if msg == "no credentials"));
        assert!(req.interceptor().is_none());
        assert!(tracker.get_all_requests().is_empty());
    }

    #[test]
    fn failing_previous_interceptor_prevents_recording() {
        let tracker = TrackingInitializer::new();
        let mut req = pending("https://www.googleapis.com/storage/v1/b/bucket");
        let failing = |_: &mut Request<Bytes>| -> Result<(), Error> {
            Err(Error::InterceptorError("signing failed".to_string()))
        };
        req.set_interceptor(Arc::new(failing));

        tracker.initialize(&mut req).unwrap();
        assert!(execute(req).is_err());
        assert!(tracker.get_all_requests().is_empty());
    }

    #[test]
    fn instances_do_not_share_history() {
        let first = TrackingInitializer::new();
        let second = TrackingInitializer::new();

        let mut req = pending("https://www.googleapis.com/storage/v1/b/one");
        first.initialize(&mut req).unwrap();
        execute(req).unwrap();

        assert_eq!(first.get_all_requests().len(), 1);
        assert!(second.get_all_requests().is_empty());
    }
}
