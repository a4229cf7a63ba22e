use bytes::Bytes;
use http::Request;
use std::{fmt, sync::Arc};

use crate::common::data::Error;

/// Called once per logical request, when the request has been built but before it is executed.
///
/// Initializers typically add headers or install an [HttpExecuteInterceptor] on the request.
pub trait HttpRequestInitializer: Send + Sync {
    fn initialize(&self, request: &mut PendingRequest) -> Result<(), Error>;
}

/// Called immediately before a request is handed to the transport. If a request is retried,
/// the interceptor runs again for every attempt.
pub trait HttpExecuteInterceptor: Send + Sync {
    fn intercept(&self, request: &mut Request<Bytes>) -> Result<(), Error>;
}

impl<F> HttpRequestInitializer for F
where
    F: Fn(&mut PendingRequest) -> Result<(), Error> + Send + Sync,
{
    fn initialize(&self, request: &mut PendingRequest) -> Result<(), Error> {
        (self)(request)
    }
}

impl<F> HttpExecuteInterceptor for F
where
    F: Fn(&mut Request<Bytes>) -> Result<(), Error> + Send + Sync,
{
    fn intercept(&self, request: &mut Request<Bytes>) -> Result<(), Error> {
        (self)(request)
    }
}

/// A request that has been built by the client but not yet executed, together with the
/// execute interceptor that is currently installed on it.
pub struct PendingRequest {
    request: Request<Bytes>,
    interceptor: Option<Arc<dyn HttpExecuteInterceptor>>,
}

impl PendingRequest {
    pub fn new(request: Request<Bytes>) -> Self {
        Self {
            request,
            interceptor: None,
        }
    }

    pub fn method(&self) -> &http::Method {
        self.request.method()
    }

    pub fn uri(&self) -> &http::Uri {
        self.request.uri()
    }

    pub fn headers_mut(&mut self) -> &mut http::HeaderMap {
        self.request.headers_mut()
    }

    pub fn body(&self) -> &Bytes {
        self.request.body()
    }

    pub fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    /// Returns the currently installed execute interceptor, if any.
    pub fn interceptor(&self) -> Option<Arc<dyn HttpExecuteInterceptor>> {
        self.interceptor.clone()
    }

    /// Replaces the installed execute interceptor. Callers that want to keep existing behavior
    /// must read [PendingRequest::interceptor] first and call it from the new interceptor.
    pub fn set_interceptor(&mut self, interceptor: Arc<dyn HttpExecuteInterceptor>) {
        self.interceptor = Some(interceptor);
    }

    pub fn into_parts(self) -> (Request<Bytes>, Option<Arc<dyn HttpExecuteInterceptor>>) {
        (self.request, self.interceptor)
    }
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("request", &self.request)
            .field("has_interceptor", &self.interceptor.is_some())
            .finish()
    }
}
