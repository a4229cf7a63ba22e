use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid root URL: {0}")]
    InvalidRootUrl(String),
    #[error("request initializer failed: {0}")]
    InitializerError(String),
    #[error("execute interceptor failed: {0}")]
    InterceptorError(String),
    #[error("cannot send request: {0}")]
    TransportError(String),
    #[error("cannot serialize recorded requests: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// An immutable capture of one outgoing HTTP request, taken right before it was handed
/// to the transport.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    method: String,
    uri: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl RecordedRequest {
    pub fn new(
        method: impl Into<String>,
        uri: impl Into<String>,
        headers: Vec<(String, String)>,
        body: Bytes,
    ) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            headers,
            body,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The full request URI, including the query string.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the first header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the object name carried in the JSON metadata part of a `multipart/related`
    /// upload body, if this request is such an upload.
    ///
    /// The storage multipart upload encoding places the object resource (including its `name`)
    /// in the first part and the object content in the second part.
    pub fn multipart_object_name(&self) -> Option<String> {
        let content_type = self.header("content-type")?;
        if !content_type
            .trim_start()
            .to_ascii_lowercase()
            .starts_with("multipart/related")
        {
            return None;
        }

        let boundary = content_type.split(';').find_map(|param| {
            let (name, value) = param.split_once('=')?;
            name.trim()
                .eq_ignore_ascii_case("boundary")
                .then(|| value.trim().trim_matches('"'))
        })?;

        // Only the metadata part is decoded; the content part may hold arbitrary bytes.
        let delimiter = format!("--{}", boundary);
        let delimiter = delimiter.as_bytes();
        let start = find_subslice(&self.body, delimiter)? + delimiter.len();
        let rest = &self.body[start..];
        let end = find_subslice(rest, delimiter).unwrap_or(rest.len());
        let part = std::str::from_utf8(&rest[..end]).ok()?.trim();

        let content = if part.starts_with('{') {
            part
        } else {
            part.split_once("\r\n\r\n")
                .or_else(|| part.split_once("\n\n"))
                .map(|(_, content)| content)?
        };

        let metadata: serde_json::Value = serde_json::from_str(content.trim()).ok()?;
        metadata.get("name")?.as_str().map(str::to_string)
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

impl From<&http::Request<Bytes>> for RecordedRequest {
    fn from(value: &http::Request<Bytes>) -> Self {
        let headers = value
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();

        // Since Bytes shares data, clone does not copy the body.
        RecordedRequest::new(
            value.method().as_str(),
            value.uri().to_string(),
            headers,
            value.body().clone(),
        )
    }
}

impl fmt::Display for RecordedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.uri)
    }
}
