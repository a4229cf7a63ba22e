use bytes::Bytes;
use futures_util::future::join_all;
use http::{Request, Response};
use std::{sync::Arc, time::Duration};

use crate::{
    api::hooks::{HttpRequestInitializer, PendingRequest},
    common::{data::Error, http::HttpClient, util::with_retry},
};

/// Wraps an [HttpClient] and drives the initializer and execute interceptor hook points the
/// same way a full HTTP client framework would.
///
/// The initializer runs once per logical request. The execute interceptor runs right before
/// every attempt, so a retried request passes through it (and gets recorded) once per attempt.
pub struct InterceptingClient<C> {
    inner: C,
    initializer: Arc<dyn HttpRequestInitializer>,
    retries: usize,
    retry_delay: Duration,
}

impl<C> InterceptingClient<C>
where
    C: HttpClient + Send + Sync,
{
    pub fn new(inner: C, initializer: Arc<dyn HttpRequestInitializer>) -> Self {
        Self {
            inner,
            initializer,
            retries: 0,
            retry_delay: Duration::ZERO,
        }
    }

    /// Number of additional attempts made when the transport fails.
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Base delay between attempts. The n-th retry waits `n * delay`.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>, Error> {
        let mut pending = PendingRequest::new(request);
        self.initializer.initialize(&mut pending)?;

        let (request, interceptor) = pending.into_parts();
        let is_retryable = |err: &Error| matches!(err, Error::TransportError(_));

        with_retry(self.retries, self.retry_delay, is_retryable, || {
            let mut attempt = copy_request(&request);
            let interceptor = interceptor.clone();
            async move {
                if let Some(interceptor) = interceptor {
                    interceptor.intercept(&mut attempt)?;
                }
                self.inner.send(attempt).await
            }
        })
        .await
    }

    /// Sends all requests concurrently, like the sub-requests of a batch. Results are returned
    /// in the order of the input requests.
    pub async fn send_all(
        &self,
        requests: Vec<Request<Bytes>>,
    ) -> Vec<Result<Response<Bytes>, Error>> {
        join_all(requests.into_iter().map(|req| self.send(req))).await
    }
}

// Extensions are not carried over; they are not part of the wire format.
fn copy_request(req: &Request<Bytes>) -> Request<Bytes> {
    let mut copy = Request::new(req.body().clone());
    *copy.method_mut() = req.method().clone();
    *copy.uri_mut() = req.uri().clone();
    *copy.version_mut() = req.version();
    *copy.headers_mut() = req.headers().clone();
    copy
}
