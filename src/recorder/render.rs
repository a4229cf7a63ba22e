use regex::{NoExpand, Regex};
use std::sync::{Arc, LazyLock};

use crate::common::data::RecordedRequest;

const PAGE_TOKEN_PARAM_PATTERN: &str = "&pageToken=[^&]+";

const GENERATION_MATCH_TOKEN_PARAM_PATTERN: &str = "ifGenerationMatch=[^&]+";

static PAGE_TOKEN_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(PAGE_TOKEN_PARAM_PATTERN).expect("page token pattern must compile")
});

static GENERATION_MATCH_TOKEN_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(GENERATION_MATCH_TOKEN_PARAM_PATTERN)
        .expect("generation match pattern must compile")
});

/// Renders a recorded request as `METHOD:URI`.
///
/// Multipart uploads carry the object name in the request body rather than in the URI, so
/// for those the name is appended as `METHOD:URI:NAME`.
pub fn to_canonical_string(request: &RecordedRequest) -> String {
    match request.multipart_object_name() {
        Some(name) => format!("{}:{}:{}", request.method(), request.uri(), name),
        None => format!("{}:{}", request.method(), request.uri()),
    }
}

/// Replaces runtime generated pagination and generation match tokens with sequential
/// placeholders.
///
/// Both counters advance once per processed string, whether or not the string contains a
/// matching parameter, so a placeholder index always equals the position of the string in
/// the rendered sequence.
#[derive(Debug, Default)]
pub struct TokenNormalizer {
    next_page_token_id: u64,
    next_generation_match_id: u64,
}

impl TokenNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, canonical: &str) -> String {
        let page_token_id = self.next_page_token_id;
        self.next_page_token_id += 1;
        let generation_match_id = self.next_generation_match_id;
        self.next_generation_match_id += 1;

        let replaced = replace_page_token(canonical, page_token_id);
        replace_generation_match_token(&replaced, generation_match_id)
    }
}

fn replace_page_token(canonical: &str, page_token_id: u64) -> String {
    let replacement = format!("&pageToken=token_{}", page_token_id);
    PAGE_TOKEN_PARAM
        .replace_all(canonical, NoExpand(&replacement))
        .into_owned()
}

fn replace_generation_match_token(canonical: &str, generation_match_id: u64) -> String {
    let replacement = format!(
        "ifGenerationMatch=GenerationMatch_token_{}",
        generation_match_id
    );
    GENERATION_MATCH_TOKEN_PARAM
        .replace_all(canonical, NoExpand(&replacement))
        .into_owned()
}

/// Normalizes an ordered sequence of canonical strings with fresh counters.
pub fn normalize<I, S>(canonical: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalizer = TokenNormalizer::new();
    canonical
        .into_iter()
        .map(|s| normalizer.normalize(s.as_ref()))
        .collect()
}

/// Renders and normalizes a snapshot of recorded requests, preserving its order.
pub fn render(requests: &[Arc<RecordedRequest>]) -> Vec<String> {
    tracing::trace!("Rendering {} recorded requests", requests.len());
    normalize(requests.iter().map(|r| to_canonical_string(r)))
}

#[cfg(test)]
mod test {
    use super::{normalize, render, to_canonical_string};
    use crate::common::data::RecordedRequest;
    use bytes::Bytes;
    use std::sync::Arc;

    fn request(method: &str, uri: &str) -> Arc<RecordedRequest> {
        Arc::new(RecordedRequest::new(method, uri, Vec::new(), Bytes::new()))
    }

    #[test]
    fn renders_method_and_uri() {
        let req = request("GET", "https://www.googleapis.com/storage/v1/b/bucket");
        assert_eq!(
            to_canonical_string(&req),
            "GET:https://www.googleapis.com/storage/v1/b/bucket"
        );
        // Rendering is deterministic.
        assert_eq!(to_canonical_string(&req), to_canonical_string(&req));
    }

    #[test]
    fn appends_object_name_for_multipart_uploads() {
        let req = RecordedRequest::new(
            "POST",
            "https://www.googleapis.com/upload/storage/v1/b/bucket/o?uploadType=multipart",
            vec![(
                "content-type".to_string(),
                "multipart/related; boundary=xyz".to_string(),
            )],
            Bytes::from_static(b"--xyz\r\n\r\n{\"name\":\"obj\"}\r\n--xyz\r\n\r\ndata\r\n--xyz--"),
        );

        assert_eq!(
            to_canonical_string(&req),
            "POST:https://www.googleapis.com/upload/storage/v1/b/bucket/o?uploadType=multipart:obj"
        );
    }

    #[test]
    fn page_tokens_are_numbered_by_position() {
        let rendered = render(&[
            request("GET", "https://h/b/x/o?maxResults=1&pageToken=abc123&prefix=p"),
            request("GET", "https://h/b/x/o?maxResults=1&pageToken=xyz789&prefix=p"),
        ]);

        assert_eq!(
            rendered,
            vec![
                "GET:https://h/b/x/o?maxResults=1&pageToken=token_0&prefix=p",
                "GET:https://h/b/x/o?maxResults=1&pageToken=token_1&prefix=p",
            ]
        );
    }

    #[test]
    fn counters_advance_for_strings_without_tokens() {
        let rendered = normalize(vec![
            "GET:https://h/b/x",
            "POST:https://h/b/x/o/obj/compose?ifGenerationMatch=42",
            "GET:https://h/b/x/o?maxResults=1&pageToken=abc",
            "DELETE:https://h/b/x/o/obj?ifGenerationMatch=7",
        ]);

        assert_eq!(
            rendered,
            vec![
                "GET:https://h/b/x",
                "POST:https://h/b/x/o/obj/compose?ifGenerationMatch=GenerationMatch_token_1",
                "GET:https://h/b/x/o?maxResults=1&pageToken=token_2",
                "DELETE:https://h/b/x/o/obj?ifGenerationMatch=GenerationMatch_token_3",
            ]
        );
    }

    #[test]
    fn generation_match_stops_at_next_parameter() {
        let rendered = normalize(vec![
            "POST:https://h/upload/b/x/o?ifGenerationMatch=0&uploadType=multipart:obj",
        ]);

        assert_eq!(
            rendered,
            vec!["POST:https://h/upload/b/x/o?ifGenerationMatch=GenerationMatch_token_0&uploadType=multipart:obj"]
        );
    }

    #[test]
    fn leading_page_token_parameter_is_not_replaced() {
        // Only `&pageToken=` occurrences are volatile.
        let rendered = normalize(vec!["GET:https://h/o?pageToken=abc"]);
        assert_eq!(rendered, vec!["GET:https://h/o?pageToken=abc"]);
    }
}
