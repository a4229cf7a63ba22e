use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::common::data::Error;

impl From<hyper::Error> for Error {
    fn from(err: hyper::Error) -> Self {
        Error::TransportError(err.to_string())
    }
}

impl From<hyper_util::client::legacy::Error> for Error {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        Error::TransportError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::TransportError(format!("runtime error: {}", err))
    }
}

/// The transport that actually puts requests on the wire.
#[async_trait]
pub trait HttpClient {
    async fn send(&self, req: Request<Bytes>) -> Result<Response<Bytes>, Error>;
}

/// A plain HTTP/1 client backed by `hyper-util`.
///
/// When a runtime is provided, requests are spawned onto it, which allows using the client
/// from outside of a Tokio context.
pub struct HyperHttpClient {
    runtime: Option<Arc<Runtime>>,
    client: Arc<Client<HttpConnector, Full<Bytes>>>,
}

impl HyperHttpClient {
    pub fn new(runtime: Option<Arc<Runtime>>) -> Self {
        Self {
            runtime,
            client: Arc::new(Client::builder(TokioExecutor::new()).build(HttpConnector::new())),
        }
    }
}

impl Default for HyperHttpClient {
    fn default() -> Self {
        HyperHttpClient::new(None)
    }
}

#[async_trait]
impl HttpClient for HyperHttpClient {
    async fn send(&self, req: Request<Bytes>) -> Result<Response<Bytes>, Error> {
        let (req_parts, req_body) = req.into_parts();
        let hyper_req = Request::from_parts(req_parts, Full::new(req_body));

        let res = if let Some(rt) = self.runtime.clone() {
            let client = self.client.clone();
            rt.spawn(async move { client.request(hyper_req).await })
                .await??
        } else {
            self.client.request(hyper_req).await?
        };

        let (res_parts, res_body) = res.into_parts();
        let body = res_body.collect().await?.to_bytes();

        Ok(Response::from_parts(res_parts, body))
    }
}
