//! Handler records indexed by the trie.

use axum::http::Method;
use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::routing::query::QueryMap;
use crate::routing::template::{PathTemplate, PathVars};
use crate::routing::value::ValueKind;

/// Response produced by a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HandlerResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}

/// Everything a callback gets to see about the matched request.
#[derive(Debug)]
pub struct RequestContext<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub client: SocketAddr,
    pub queries: &'a QueryMap,
    pub path_vars: &'a PathVars,
    /// Canned response declared alongside the handler.
    pub response: &'a HandlerResponse,
}

/// A response-producing callback, registered by name before startup.
pub trait Callback: Send + Sync {
    fn handle(&self, ctx: &RequestContext<'_>) -> HandlerResponse;
}

impl<F> Callback for F
where
    F: Fn(&RequestContext<'_>) -> HandlerResponse + Send + Sync,
{
    fn handle(&self, ctx: &RequestContext<'_>) -> HandlerResponse {
        self(ctx)
    }
}

/// Box a closure as a shared [`Callback`].
pub fn callback<F>(f: F) -> Arc<dyn Callback>
where
    F: Fn(&RequestContext<'_>) -> HandlerResponse + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A validated handler, immutable once inserted into the trie.
#[derive(Clone)]
pub struct Handler {
    pub name: String,
    pub template: PathTemplate,
    pub method: Method,
    /// Header name → media-type template.
    pub headers: BTreeMap<String, String>,
    /// Query parameter name → expected kind. Empty means "no parameters".
    pub queries: BTreeMap<String, ValueKind>,
    pub response: HandlerResponse,
    pub callback: Arc<dyn Callback>,
}

impl Handler {
    /// Two handlers with the same method and constraints can never be told apart.
    pub fn is_ambiguous_with(&self, other: &Handler) -> bool {
        self.method == other.method
            && self.queries == other.queries
            && self.headers.len() == other.headers.len()
            && self.headers.iter().all(|(name, template)| {
                other
                    .headers
                    .iter()
                    .any(|(n, t)| n.eq_ignore_ascii_case(name) && t == template)
            })
    }

    pub fn invoke(&self, ctx: &RequestContext<'_>) -> HandlerResponse {
        self.callback.handle(ctx)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("template", &self.template.as_str())
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("queries", &self.queries)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::handler;
    use super::*;

    #[test]
    fn test_ambiguity_ignores_header_name_case() {
        let mut a = handler("a", Method::GET, "/x");
        let mut b = handler("b", Method::GET, "/x");
        a.headers.insert("Accept".into(), "text/html".into());
        b.headers.insert("accept".into(), "text/html".into());
        assert!(a.is_ambiguous_with(&b));

        b.queries.insert("id".into(), ValueKind::Integer);
        assert!(!a.is_ambiguous_with(&b));

        let c = handler("c", Method::POST, "/x");
        assert!(!handler("d", Method::GET, "/x").is_ambiguous_with(&c));
    }

    #[test]
    fn test_invoke_runs_callback() {
        let h = handler("hello", Method::GET, "/hello");
        let queries = QueryMap::new();
        let vars = PathVars::new();
        let ctx = RequestContext {
            method: &Method::GET,
            path: "/hello",
            client: "127.0.0.1:5000".parse().unwrap(),
            queries: &queries,
            path_vars: &vars,
            response: &h.response,
        };
        assert_eq!(h.invoke(&ctx).body, b"hello".to_vec());
    }
}
