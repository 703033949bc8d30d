//! Request dispatch: path lookup, handler selection, variable extraction.
//!
//! # Responsibilities
//! - Own the handler trie built at startup
//! - Resolve a raw request to exactly one handler plus its path variables
//! - Report an explicit `NotFound` otherwise
//!
//! # Design Decisions
//! - Immutable after construction (shared via `Arc`, no locks)
//! - Candidate buckets are tried best first; `NotFound` once all are exhausted
//! - Path variables ignore one trailing `/`, as routing does

use axum::http::{HeaderMap, Method};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::routing::handler::{Handler, HandlerResponse, RequestContext};
use crate::routing::matcher::{RequestMatcher, RequestView};
use crate::routing::query::{self, QueryMap};
use crate::routing::template::PathVars;
use crate::routing::trie::{HandlerTrie, TrieError};

/// A successful dispatch.
#[derive(Debug, Clone)]
pub struct Match {
    pub handler: Arc<Handler>,
    pub path: String,
    pub path_vars: PathVars,
    pub queries: QueryMap,
}

impl Match {
    /// Run the matched handler's callback.
    pub fn respond(&self, method: &Method, client: SocketAddr) -> HandlerResponse {
        let ctx = RequestContext {
            method,
            path: &self.path,
            client,
            queries: &self.queries,
            path_vars: &self.path_vars,
            response: &self.handler.response,
        };
        self.handler.invoke(&ctx)
    }
}

/// Outcome of [`Dispatcher::dispatch`].
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Matched(Match),
    NotFound,
}

impl DispatchOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, DispatchOutcome::Matched(_))
    }

    pub fn into_match(self) -> Option<Match> {
        match self {
            DispatchOutcome::Matched(m) => Some(m),
            DispatchOutcome::NotFound => None,
        }
    }
}

/// Top-level matching engine.
#[derive(Debug, Default)]
pub struct Dispatcher {
    trie: HandlerTrie,
    matcher: RequestMatcher,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dispatcher from handlers, skipping (and logging) the ones that
    /// cannot be indexed. Returns the dispatcher and the number skipped.
    pub fn from_handlers(handlers: impl IntoIterator<Item = Handler>) -> (Self, usize) {
        let mut dispatcher = Self::new();
        let mut skipped = 0;
        for handler in handlers {
            let name = handler.name.clone();
            if let Err(e) = dispatcher.register(handler) {
                tracing::warn!(handler = %name, error = %e, "Failed to map handler");
                skipped += 1;
            }
        }
        (dispatcher, skipped)
    }

    /// Index one handler. Only meaningful before the dispatcher is shared.
    pub fn register(&mut self, handler: Handler) -> Result<(), TrieError> {
        tracing::debug!(
            handler = %handler.name,
            method = %handler.method,
            path = %handler.template.as_str(),
            "Mapping handler"
        );
        self.trie.insert(Arc::new(handler))
    }

    pub fn handler_count(&self) -> usize {
        self.trie.len()
    }

    /// Resolve a request to a handler and its path variables.
    ///
    /// Candidate buckets are tried best first; a bucket whose handlers all
    /// fail the matchers or extraction yields to the next one. `HEAD` falls
    /// back to the `GET` handlers when no `HEAD` handler matches.
    pub fn dispatch(
        &self,
        method: &Method,
        raw_path: &str,
        headers: &HeaderMap,
        client: SocketAddr,
    ) -> DispatchOutcome {
        let (path, query) = query::split_path_and_query(raw_path);
        let queries = query.map(query::decode).unwrap_or_default();

        let candidates = self.trie.candidates(method, path);
        let view = RequestView {
            method,
            headers,
            queries: &queries,
        };
        for bucket in &candidates {
            let Some(handler) = self.matcher.select(bucket, &view) else {
                continue;
            };
            match handler.template.extract_route(path) {
                Ok(path_vars) => {
                    tracing::debug!(
                        client = %client,
                        method = %method,
                        path = %path,
                        handler = %handler.name,
                        "Handler matched"
                    );
                    return DispatchOutcome::Matched(Match {
                        handler: Arc::clone(handler),
                        path: path.to_string(),
                        path_vars,
                        queries,
                    });
                }
                Err(e) => tracing::debug!(
                    handler = %handler.name,
                    path = %path,
                    error = %e,
                    "Path variables could not be extracted"
                ),
            }
        }

        if *method == Method::HEAD {
            return self.dispatch(&Method::GET, raw_path, headers, client);
        }

        tracing::debug!(
            client = %client,
            method = %method,
            path = %path,
            candidates = candidates.len(),
            "No handler matched"
        );
        DispatchOutcome::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::test_support::handler;
    use crate::routing::value::{ScalarValue, ValueKind};

    fn client() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn dispatcher(handlers: Vec<Handler>) -> Dispatcher {
        let (dispatcher, skipped) = Dispatcher::from_handlers(handlers);
        assert_eq!(skipped, 0);
        dispatcher
    }

    #[test]
    fn test_end_to_end_item_lookup() {
        let d = dispatcher(vec![handler("item", Method::GET, "/items/$$sku$$")]);
        let headers = HeaderMap::new();

        let m = d
            .dispatch(&Method::GET, "/items/abc123", &headers, client())
            .into_match()
            .unwrap();
        assert_eq!(m.handler.name, "item");
        assert_eq!(m.path_vars["sku"], ScalarValue::String("abc123".into()));

        assert!(!d
            .dispatch(&Method::POST, "/items/abc123", &headers, client())
            .is_matched());
    }

    #[test]
    fn test_queries_are_decoded_and_matched() {
        let mut h = handler("search", Method::GET, "/search");
        h.queries.insert("page".into(), ValueKind::Integer);
        let d = dispatcher(vec![h]);
        let headers = HeaderMap::new();

        let m = d
            .dispatch(&Method::GET, "/search?page=3", &headers, client())
            .into_match()
            .unwrap();
        assert_eq!(m.queries["page"], ScalarValue::Integer(3));

        assert!(!d
            .dispatch(&Method::GET, "/search?page=three", &headers, client())
            .is_matched());
        assert!(!d
            .dispatch(&Method::GET, "/search", &headers, client())
            .is_matched());
    }

    #[test]
    fn test_extraction_failure_is_not_found() {
        let d = dispatcher(vec![handler("posts", Method::GET, "/users/$$id$$/posts")]);
        let headers = HeaderMap::new();
        assert!(d
            .dispatch(&Method::GET, "/users/7/posts", &headers, client())
            .is_matched());
        // Routed through the variable child, but nothing to capture.
        assert!(!d
            .dispatch(&Method::GET, "/users//posts", &headers, client())
            .is_matched());
    }

    #[test]
    fn test_from_handlers_skips_unmappable() {
        let (d, skipped) = Dispatcher::from_handlers(vec![
            handler("ok", Method::GET, "/ok"),
            handler("bad", Method::GET, "no-slash"),
        ]);
        assert_eq!(skipped, 1);
        assert_eq!(d.handler_count(), 1);
    }

    #[test]
    fn test_duplicate_registration_keeps_first_match() {
        let h = handler("dup", Method::GET, "/dup");
        let d = dispatcher(vec![h.clone(), h]);
        assert_eq!(d.handler_count(), 2);
        let m = d
            .dispatch(&Method::GET, "/dup", &HeaderMap::new(), client())
            .into_match()
            .unwrap();
        assert_eq!(m.handler.name, "dup");
    }

    #[test]
    fn test_respond_invokes_callback() {
        let d = dispatcher(vec![handler("hello", Method::GET, "/hello")]);
        let m = d
            .dispatch(&Method::GET, "/hello", &HeaderMap::new(), client())
            .into_match()
            .unwrap();
        let response = m.respond(&Method::GET, client());
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"hello".to_vec());
    }

    #[test]
    fn test_trailing_slash_binds_same_variables() {
        let d = dispatcher(vec![
            handler("user", Method::GET, "/users/$$id$$"),
            handler("a", Method::GET, "/a/$$x$$/"),
        ]);
        let headers = HeaderMap::new();

        let m = d
            .dispatch(&Method::GET, "/users/42/", &headers, client())
            .into_match()
            .unwrap();
        assert_eq!(m.path_vars["id"], ScalarValue::Integer(42));

        let m = d
            .dispatch(&Method::GET, "/a/1", &headers, client())
            .into_match()
            .unwrap();
        assert_eq!(m.path_vars["x"], ScalarValue::Integer(1));
    }

    #[test]
    fn test_literal_constraints_fall_back_to_variable_route() {
        let mut special = handler("special", Method::GET, "/items/special");
        special
            .headers
            .insert("Accept".into(), "application/json".into());
        let d = dispatcher(vec![special, handler("item", Method::GET, "/items/$$sku$$")]);

        let mut headers = HeaderMap::new();
        headers.insert("accept", "text/html".parse().unwrap());
        let m = d
            .dispatch(&Method::GET, "/items/special", &headers, client())
            .into_match()
            .unwrap();
        assert_eq!(m.handler.name, "item");
        assert_eq!(m.path_vars["sku"], ScalarValue::String("special".into()));

        headers.insert("accept", "application/json".parse().unwrap());
        let m = d
            .dispatch(&Method::GET, "/items/special", &headers, client())
            .into_match()
            .unwrap();
        assert_eq!(m.handler.name, "special");
    }

    #[test]
    fn test_head_uses_get_handlers() {
        let d = dispatcher(vec![
            handler("page", Method::GET, "/page"),
            handler("status-check", Method::HEAD, "/status"),
        ]);
        let headers = HeaderMap::new();
        let m = d
            .dispatch(&Method::HEAD, "/page", &headers, client())
            .into_match()
            .unwrap();
        assert_eq!(m.handler.name, "page");
        assert_eq!(
            d.dispatch(&Method::HEAD, "/status", &headers, client())
                .into_match()
                .unwrap()
                .handler
                .name,
            "status-check"
        );
        assert!(!d
            .dispatch(&Method::HEAD, "/missing", &headers, client())
            .is_matched());
        assert!(!d
            .dispatch(&Method::GET, "/status", &headers, client())
            .is_matched());
    }
}
