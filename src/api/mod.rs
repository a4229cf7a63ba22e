pub use client::InterceptingClient;
pub use encoding::encode_object_name;
pub use hooks::{HttpExecuteInterceptor, HttpRequestInitializer, PendingRequest};
pub use requests::{
    batch_request_string, compose_request_string, copy_request_string,
    delete_generation_request_string, delete_request_string, get_bucket_request_string,
    get_request_string, list_request_string, list_request_string_with_trailing_delimiter,
    post_request_string, update_metadata_request_string, upload_request_string, CopyKind,
    Endpoints, StorageRequest, DEFAULT_ROOT_URL, ROOT_URL_ENV_VAR,
};
pub use tracking::TrackingInitializer;

mod client;
mod encoding;
mod hooks;
mod requests;
mod tracking;
