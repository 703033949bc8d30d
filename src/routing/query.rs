//! Query-string decoding.

use std::collections::BTreeMap;
use url::form_urlencoded;

use crate::routing::value::ScalarValue;

/// Decoded query parameters, keyed by name.
pub type QueryMap = BTreeMap<String, ScalarValue>;

/// Decode `a=1&b=x` into typed scalars.
///
/// Pairs without exactly one `=` are dropped. Keys and values are
/// percent-decoded before the literal-parse rule is applied to the value.
/// A repeated key keeps its last value.
pub fn decode(query: &str) -> QueryMap {
    let mut queries = QueryMap::new();
    for pair in query.split('&') {
        if pair.matches('=').count() != 1 {
            continue;
        }
        let Some((key, value)) = form_urlencoded::parse(pair.as_bytes()).next() else {
            continue;
        };
        queries.insert(key.into_owned(), ScalarValue::parse_literal(&value));
    }
    queries
}

/// Split a raw request target into its path and optional query string.
pub fn split_path_and_query(raw_path: &str) -> (&str, Option<&str>) {
    match raw_path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (raw_path, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_typed_values() {
        let q = decode("id=5&ratio=0.5&flag=true&none=None&name=bob");
        assert_eq!(q.len(), 5);
        assert_eq!(q["id"], ScalarValue::Integer(5));
        assert_eq!(q["ratio"], ScalarValue::Float(0.5));
        assert_eq!(q["flag"], ScalarValue::Boolean(true));
        assert_eq!(q["none"], ScalarValue::Null);
        assert_eq!(q["name"], ScalarValue::String("bob".into()));
    }

    #[test]
    fn test_decode_drops_malformed_pairs() {
        let q = decode("a=1&b&c=1=2&&d=");
        assert_eq!(q.len(), 2);
        assert_eq!(q["a"], ScalarValue::Integer(1));
        assert_eq!(q["d"], ScalarValue::String(String::new()));
        assert!(decode("").is_empty());
    }

    #[test]
    fn test_decode_percent_encoding() {
        let q = decode("greeting=hello%20world&plus=a+b");
        assert_eq!(q["greeting"], ScalarValue::String("hello world".into()));
        assert_eq!(q["plus"], ScalarValue::String("a b".into()));
    }

    #[test]
    fn test_split_path_and_query() {
        assert_eq!(split_path_and_query("/a/b?x=1"), ("/a/b", Some("x=1")));
        assert_eq!(split_path_and_query("/a/b"), ("/a/b", None));
        assert_eq!(split_path_and_query("/a?x=1?y"), ("/a", Some("x=1?y")));
    }
}
