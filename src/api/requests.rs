use std::fmt;
use url::Url;

use crate::{
    api::encoding::encode_object_name,
    common::{data::Error, util::read_env},
};

pub const DEFAULT_ROOT_URL: &str = "https://www.googleapis.com";

/// Environment variable that overrides the root URL used by [Endpoints::from_env].
pub const ROOT_URL_ENV_VAR: &str = "STORAGE_TRACKING_ROOT_URL";

/// Base URLs of the storage JSON API that request strings are rendered against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    root_url: String,
}

impl Endpoints {
    /// Creates endpoints for the given root URL (e.g. `http://127.0.0.1:5000` when targeting a
    /// local server). A trailing slash is ignored.
    pub fn new(root_url: &str) -> Result<Self, Error> {
        let parsed = Url::parse(root_url)
            .map_err(|err| Error::InvalidRootUrl(format!("{}: {}", root_url, err)))?;
        if !parsed.has_host() {
            return Err(Error::InvalidRootUrl(format!(
                "{}: URL has no host",
                root_url
            )));
        }

        Ok(Self {
            root_url: root_url.trim_end_matches('/').to_string(),
        })
    }

    /// Reads the root URL from `STORAGE_TRACKING_ROOT_URL`, falling back to the public
    /// endpoint.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(&read_env(ROOT_URL_ENV_VAR, DEFAULT_ROOT_URL))
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    pub fn storage_url(&self) -> String {
        format!("{}/storage/v1", self.root_url)
    }

    pub fn upload_url(&self) -> String {
        format!("{}/upload/storage/v1", self.root_url)
    }

    pub fn batch_url(&self) -> String {
        format!("{}/batch/storage/v1", self.root_url)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
        }
    }
}

/// The two server-side copy operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyKind {
    CopyTo,
    RewriteTo,
}

impl fmt::Display for CopyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyKind::CopyTo => f.write_str("copyTo"),
            CopyKind::RewriteTo => f.write_str("rewriteTo"),
        }
    }
}

/// A logical storage operation whose canonical request string can be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageRequest {
    GetObject {
        bucket: String,
        object: String,
    },
    GetBucket {
        bucket: String,
    },
    PostObject {
        bucket: String,
        object: String,
    },
    Copy {
        src_bucket: String,
        src_object: String,
        dst_bucket: String,
        dst_object: String,
        kind: CopyKind,
    },
    Upload {
        bucket: String,
        object: String,
        generation_match: bool,
    },
    UpdateMetadata {
        bucket: String,
        object: String,
        meta_generation: i64,
    },
    DeleteMetageneration {
        bucket: String,
        object: String,
        meta_generation: i64,
    },
    DeleteGenerationMatch {
        bucket: String,
        object: String,
        generation_match_token: Option<String>,
    },
    Compose {
        bucket: String,
        object: String,
        generation_match_token: Option<String>,
    },
    List {
        bucket: String,
        include_trailing_delimiter: bool,
        prefix: String,
        max_results: u64,
        page_token: Option<String>,
    },
    Batch,
}

impl StorageRequest {
    /// Renders the exact string a tracking initializer reports for an equivalent request.
    pub fn render(&self, endpoints: &Endpoints) -> String {
        let storage = endpoints.storage_url();

        match self {
            StorageRequest::GetObject { bucket, object } => format!(
                "GET:{}/b/{}/o/{}",
                storage,
                bucket,
                encode_object_name(object)
            ),
            StorageRequest::GetBucket { bucket } => bucket_string(endpoints, bucket),
            StorageRequest::PostObject { bucket, object } => format!(
                "POST:{}/b/{}/o/{}",
                storage,
                bucket,
                encode_object_name(object)
            ),
            StorageRequest::Copy {
                src_bucket,
                src_object,
                dst_bucket,
                dst_object,
                kind,
            } => format!(
                "POST:{}/b/{}/o/{}/{}/b/{}/o/{}",
                storage,
                src_bucket,
                encode_object_name(src_object),
                kind,
                dst_bucket,
                encode_object_name(dst_object)
            ),
            StorageRequest::Upload {
                bucket,
                object,
                generation_match,
            } => upload_string(endpoints, bucket, object, *generation_match),
            StorageRequest::UpdateMetadata {
                bucket,
                object,
                meta_generation,
            } => format!(
                "POST:{}/b/{}/o/{}?ifMetagenerationMatch={}",
                storage,
                bucket,
                encode_object_name(object),
                meta_generation
            ),
            StorageRequest::DeleteMetageneration {
                bucket,
                object,
                meta_generation,
            } => format!(
                "DELETE:{}/b/{}/o/{}?ifMetagenerationMatch={}",
                storage,
                bucket,
                encode_object_name(object),
                meta_generation
            ),
            StorageRequest::DeleteGenerationMatch {
                bucket,
                object,
                generation_match_token,
            } => format!(
                "DELETE:{}/b/{}/o/{}?{}",
                storage,
                bucket,
                encode_object_name(object),
                generation_match_param(generation_match_token.as_deref())
            ),
            StorageRequest::Compose {
                bucket,
                object,
                generation_match_token,
            } => format!(
                "POST:{}/b/{}/o/{}/compose?{}",
                storage,
                bucket,
                encode_object_name(object),
                generation_match_param(generation_match_token.as_deref())
            ),
            StorageRequest::List {
                bucket,
                include_trailing_delimiter,
                prefix,
                max_results,
                page_token,
            } => list_string(
                endpoints,
                bucket,
                *include_trailing_delimiter,
                prefix,
                *max_results,
                page_token.as_deref(),
            ),
            StorageRequest::Batch => batch_string(endpoints),
        }
    }
}

fn bucket_string(endpoints: &Endpoints, bucket: &str) -> String {
    format!("GET:{}/b/{}", endpoints.storage_url(), bucket)
}

// The object name of an upload travels in the multipart metadata, not in the URL, so it is
// appended verbatim.
fn upload_string(
    endpoints: &Endpoints,
    bucket: &str,
    object: &str,
    generation_match: bool,
) -> String {
    let generation_match_param = if generation_match {
        "ifGenerationMatch=0&"
    } else {
        ""
    };
    format!(
        "POST:{}/b/{}/o?{}uploadType=multipart:{}",
        endpoints.upload_url(),
        bucket,
        generation_match_param,
        object
    )
}

fn list_string(
    endpoints: &Endpoints,
    bucket: &str,
    include_trailing_delimiter: bool,
    prefix: &str,
    max_results: u64,
    page_token: Option<&str>,
) -> String {
    let page_token_param = page_token
        .map(|token| format!("&pageToken={}", token))
        .unwrap_or_default();
    format!(
        "GET:{}/b/{}/o?delimiter=/&includeTrailingDelimiter={}&maxResults={}{}&prefix={}",
        endpoints.storage_url(),
        bucket,
        include_trailing_delimiter,
        max_results,
        page_token_param,
        prefix
    )
}

fn batch_string(endpoints: &Endpoints) -> String {
    format!("POST:{}", endpoints.batch_url())
}

fn generation_match_param(generation_match_token: Option<&str>) -> String {
    format!(
        "ifGenerationMatch=GenerationMatch_{}",
        generation_match_token.unwrap_or_default()
    )
}

// ************************************************************************************************
// Shorthands rendering against the public endpoint
// ************************************************************************************************
fn render_default(request: StorageRequest) -> String {
    request.render(&Endpoints::default())
}

pub fn get_request_string(bucket: &str, object: &str) -> String {
    render_default(StorageRequest::GetObject {
        bucket: bucket.to_string(),
        object: object.to_string(),
    })
}

pub fn get_bucket_request_string(bucket: &str) -> String {
    bucket_string(&Endpoints::default(), bucket)
}

pub fn post_request_string(bucket: &str, object: &str) -> String {
    render_default(StorageRequest::PostObject {
        bucket: bucket.to_string(),
        object: object.to_string(),
    })
}

pub fn copy_request_string(
    src_bucket: &str,
    src_object: &str,
    dst_bucket: &str,
    dst_object: &str,
    kind: CopyKind,
) -> String {
    render_default(StorageRequest::Copy {
        src_bucket: src_bucket.to_string(),
        src_object: src_object.to_string(),
        dst_bucket: dst_bucket.to_string(),
        dst_object: dst_object.to_string(),
        kind,
    })
}

pub fn upload_request_string(bucket: &str, object: &str, generation_match: bool) -> String {
    upload_string(&Endpoints::default(), bucket, object, generation_match)
}

pub fn update_metadata_request_string(
    bucket: &str,
    object: &str,
    meta_generation: i64,
) -> String {
    render_default(StorageRequest::UpdateMetadata {
        bucket: bucket.to_string(),
        object: object.to_string(),
        meta_generation,
    })
}

pub fn delete_request_string(
    bucket: &str,
    object: &str,
    meta_generation: i64,
) -> String {
    render_default(StorageRequest::DeleteMetageneration {
        bucket: bucket.to_string(),
        object: object.to_string(),
        meta_generation,
    })
}

pub fn delete_generation_request_string(
    bucket: &str,
    object: &str,
    generation_match_token: Option<&str>,
) -> String {
    render_default(StorageRequest::DeleteGenerationMatch {
        bucket: bucket.to_string(),
        object: object.to_string(),
        generation_match_token: generation_match_token.map(str::to_string),
    })
}

pub fn compose_request_string(
    bucket: &str,
    object: &str,
    generation_match_token: Option<&str>,
) -> String {
    render_default(StorageRequest::Compose {
        bucket: bucket.to_string(),
        object: object.to_string(),
        generation_match_token: generation_match_token.map(str::to_string),
    })
}

pub fn list_request_string(
    bucket: &str,
    prefix: &str,
    max_results: u64,
    page_token: Option<&str>,
) -> String {
    list_request_string_with_trailing_delimiter(bucket, false, prefix, max_results, page_token)
}

pub fn list_request_string_with_trailing_delimiter(
    bucket: &str,
    include_trailing_delimiter: bool,
    prefix: &str,
    max_results: u64,
    page_token: Option<&str>,
) -> String {
    list_string(
        &Endpoints::default(),
        bucket,
        include_trailing_delimiter,
        prefix,
        max_results,
        page_token,
    )
}

pub fn batch_request_string() -> String {
    batch_string(&Endpoints::default())
}
