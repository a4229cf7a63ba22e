//! `storage-tracking` records the HTTP requests a cloud storage client issues and renders them
//! into canonical strings, so integration tests can assert the exact sequence of requests a
//! piece of code produced. It contains three parts:
//!
//! * a **tracking initializer** ([TrackingInitializer]) that plugs into the request
//!   initialization hook of an HTTP client and records every request right before it is sent,
//! * a **renderer** that turns the recorded requests into `METHOD:URL` strings and replaces
//!   runtime generated tokens with predictable placeholders, and
//! * a **request string builder** with one function per storage operation that produces the
//!   string the tracking initializer would report for that operation.
//!
//! Requests are only observed. Nothing is stubbed, and the bytes that go on the wire are
//! exactly the ones the client built.
//!
//! # Getting Started
//! ```rust,no_run
//! use std::sync::Arc;
//! use bytes::Bytes;
//! use storage_tracking::prelude::*;
//!
//! # async fn run() -> Result<(), storage_tracking::Error> {
//! let tracker = Arc::new(TrackingInitializer::new());
//! let client = InterceptingClient::new(HyperHttpClient::default(), tracker.clone());
//!
//! let request = http::Request::get("https://www.googleapis.com/storage/v1/b/my-bucket")
//!     .body(Bytes::new())
//!     .unwrap();
//! client.send(request).await?;
//!
//! assert_eq!(
//!     tracker.get_all_request_strings(),
//!     vec![get_bucket_request_string("my-bucket")]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Token normalization
//! Pagination tokens (`&pageToken=...`) and generation match preconditions
//! (`ifGenerationMatch=...`) are generated at runtime. When rendering, they are replaced by
//! `token_<n>` and `GenerationMatch_token_<n>`, where `n` is the position of the request in the
//! recorded sequence. Both counters advance for every request, whether or not the request
//! carries such a parameter.
//!
//! # Hooks
//! The HTTP transport is abstracted by [HttpClient]. [InterceptingClient] drives the two hook
//! points of a request: the [HttpRequestInitializer] runs once per logical request, and the
//! [HttpExecuteInterceptor] installed by it runs right before every attempt. A retried request is
//! therefore recorded once per attempt.
//!
//! # Debugging
//! `storage-tracking` logs against the `tracing` crate (with `log` compatibility). For example,
//! with the `env_logger` backend set `RUST_LOG=storage_tracking=trace` and call
//! `env_logger::try_init()` in your test.
pub use api::{
    batch_request_string, compose_request_string, copy_request_string,
    delete_generation_request_string, delete_request_string, encode_object_name,
    get_bucket_request_string, get_request_string, list_request_string,
    list_request_string_with_trailing_delimiter, post_request_string,
    update_metadata_request_string, upload_request_string, CopyKind, Endpoints,
    HttpExecuteInterceptor, HttpRequestInitializer, InterceptingClient, PendingRequest,
    StorageRequest, TrackingInitializer, DEFAULT_ROOT_URL, ROOT_URL_ENV_VAR,
};
pub use common::{
    data::{Error, RecordedRequest},
    http::{HttpClient, HyperHttpClient},
};
pub use recorder::{normalize, render, to_canonical_string, RequestHistory, TokenNormalizer};

mod api;
mod common;
mod recorder;

pub mod prelude {
    #[doc(no_inline)]
    pub use crate::{
        batch_request_string, compose_request_string, copy_request_string,
        delete_generation_request_string, delete_request_string, get_bucket_request_string,
        get_request_string, list_request_string, list_request_string_with_trailing_delimiter,
        post_request_string, update_metadata_request_string, upload_request_string, CopyKind,
        Endpoints, Error, HttpClient, HttpExecuteInterceptor, HttpRequestInitializer,
        HyperHttpClient, InterceptingClient, PendingRequest, RecordedRequest, StorageRequest,
        TrackingInitializer,
    };
}
