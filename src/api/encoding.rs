/// Percent-encodes an object name for use as a single URL path segment.
///
/// Uses `application/x-www-form-urlencoded` byte serialization of the UTF-8 name: ASCII
/// alphanumerics and `*-._` are kept, a space becomes `+`, and every other byte becomes an
/// uppercase `%XX` escape.
pub fn encode_object_name(name: &str) -> String {
    form_urlencoded::byte_serialize(name.as_bytes()).collect()
}
