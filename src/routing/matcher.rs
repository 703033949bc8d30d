//! Handler selection within a bucket.
//!
//! # Responsibilities
//! - Filter by HTTP method (exact match)
//! - Filter by declared `Accept` / `Content-Type` templates
//! - Filter by declared query parameters (same names, same value kinds)
//! - Combine conditions with AND semantics, first surviving handler wins
//!
//! # Design Decisions
//! - A non-match is a boolean outcome, never an error
//! - Header names are case-insensitive; unknown headers always pass
//! - Bucket order (registration order) is the tie-break

use axum::http::{header, HeaderMap, Method};
use std::sync::Arc;

use crate::routing::handler::Handler;
use crate::routing::mime;
use crate::routing::query::QueryMap;

/// The parts of a request that handler constraints look at.
#[derive(Debug, Clone, Copy)]
pub struct RequestView<'a> {
    pub method: &'a Method,
    pub headers: &'a HeaderMap,
    pub queries: &'a QueryMap,
}

impl RequestView<'_> {
    /// All values of `name` joined with `,`; empty when the header is absent.
    fn header_value(&self, name: &str) -> String {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Trait for checking one kind of handler constraint against a request.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if `handler` is still a candidate for `req`.
    fn matches(&self, handler: &Handler, req: &RequestView<'_>) -> bool;
}

/// Matches the HTTP method.
#[derive(Debug, Clone, Default)]
pub struct MethodMatcher;

impl Matcher for MethodMatcher {
    fn matches(&self, handler: &Handler, req: &RequestView<'_>) -> bool {
        handler.method == *req.method
    }
}

/// Matches declared `Accept` and `Content-Type` templates.
#[derive(Debug, Clone, Default)]
pub struct HeaderMatcher;

impl Matcher for HeaderMatcher {
    fn matches(&self, handler: &Handler, req: &RequestView<'_>) -> bool {
        handler.headers.iter().all(|(name, template)| {
            if name.eq_ignore_ascii_case(header::ACCEPT.as_str()) {
                mime::accept_matches(template, &req.header_value(name))
            } else if name.eq_ignore_ascii_case(header::CONTENT_TYPE.as_str()) {
                mime::content_type_matches(template, &req.header_value(name))
            } else {
                // Other headers are reserved and not validated yet.
                true
            }
        })
    }
}

/// Matches declared query parameters by name and value kind.
#[derive(Debug, Clone, Default)]
pub struct QueryMatcher;

impl Matcher for QueryMatcher {
    fn matches(&self, handler: &Handler, req: &RequestView<'_>) -> bool {
        handler.queries.len() == req.queries.len()
            && handler.queries.iter().all(|(name, kind)| {
                req.queries
                    .get(name)
                    .is_some_and(|value| value.kind() == *kind)
            })
    }
}

/// Picks the first handler in a bucket that satisfies every matcher.
#[derive(Debug)]
pub struct RequestMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl Default for RequestMatcher {
    fn default() -> Self {
        Self::new(vec![
            Box::new(MethodMatcher),
            Box::new(HeaderMatcher),
            Box::new(QueryMatcher),
        ])
    }
}

impl RequestMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    pub fn select<'b>(
        &self,
        bucket: &'b [Arc<Handler>],
        req: &RequestView<'_>,
    ) -> Option<&'b Arc<Handler>> {
        bucket.iter().find(|handler| {
            let accepted = self.matchers.iter().all(|m| m.matches(handler, req));
            if !accepted {
                tracing::trace!(handler = %handler.name, "Candidate rejected");
            }
            accepted
        })
    }
}
