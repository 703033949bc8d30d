//! Segment trie indexing handlers by path.
//!
//! # Responsibilities
//! - Split templates on `/` and index handlers segment by segment
//! - Keep every handler registered for one path in an ordered bucket
//! - Resolve a concrete path (and method) to the buckets that can serve it, best first
//!
//! # Design Decisions
//! - Node shape is an explicit enum; there is no reserved key inside children
//! - Literal children are tried before variable children
//! - Variable children are tried in registration order (wildcard fallback)
//! - Built once at startup, read-only afterwards

use axum::http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::routing::handler::Handler;
use crate::routing::template::{is_variable_segment, route_path, PathTemplate, TemplateError};

/// Definition errors raised while inserting a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrieError {
    #[error("path '{0}' does not start with '/'")]
    MissingLeadingSlash(String),

    #[error("segment '{segment}' of path '{path}' is not a valid template: {source}")]
    InvalidSegment {
        path: String,
        segment: String,
        #[source]
        source: TemplateError,
    },
}

#[derive(Debug, Default)]
struct Children {
    literal: HashMap<String, HandlerNode>,
    variable: Vec<VariableChild>,
}

impl Children {
    fn is_empty(&self) -> bool {
        self.literal.is_empty() && self.variable.is_empty()
    }
}

#[derive(Debug)]
struct VariableChild {
    pattern: PathTemplate,
    node: HandlerNode,
}

/// A trie node: children, a terminal bucket, or both.
#[derive(Debug)]
enum HandlerNode {
    Internal {
        children: Children,
    },
    Bucket {
        handlers: Vec<Arc<Handler>>,
    },
    Both {
        children: Children,
        handlers: Vec<Arc<Handler>>,
    },
}

impl Default for HandlerNode {
    fn default() -> Self {
        HandlerNode::Internal {
            children: Children::default(),
        }
    }
}

impl HandlerNode {
    fn into_parts(self) -> (Children, Option<Vec<Arc<Handler>>>) {
        match self {
            HandlerNode::Internal { children } => (children, None),
            HandlerNode::Bucket { handlers } => (Children::default(), Some(handlers)),
            HandlerNode::Both { children, handlers } => (children, Some(handlers)),
        }
    }

    fn from_parts(children: Children, handlers: Option<Vec<Arc<Handler>>>) -> Self {
        match handlers {
            None => HandlerNode::Internal { children },
            Some(handlers) if children.is_empty() => HandlerNode::Bucket { handlers },
            Some(handlers) => HandlerNode::Both { children, handlers },
        }
    }

    fn children(&self) -> Option<&Children> {
        match self {
            HandlerNode::Internal { children } | HandlerNode::Both { children, .. } => {
                Some(children)
            }
            HandlerNode::Bucket { .. } => None,
        }
    }

    fn handlers(&self) -> Option<&[Arc<Handler>]> {
        match self {
            HandlerNode::Bucket { handlers } | HandlerNode::Both { handlers, .. } => {
                Some(handlers)
            }
            HandlerNode::Internal { .. } => None,
        }
    }

    fn with_handler(self, segments: &[Segment<'_>], handler: Arc<Handler>) -> Self {
        let (mut children, handlers) = self.into_parts();

        let Some((first, rest)) = segments.split_first() else {
            let mut handlers = handlers.unwrap_or_default();
            if let Some(existing) = handlers.iter().find(|h| h.is_ambiguous_with(&handler)) {
                tracing::warn!(
                    path = %handler.template.as_str(),
                    method = %handler.method,
                    first = %existing.name,
                    duplicate = %handler.name,
                    "Ambiguous handler registered; the first one wins"
                );
            }
            handlers.push(handler);
            return Self::from_parts(children, Some(handlers));
        };

        match first {
            Segment::Literal(key) => {
                let child = children.literal.remove(*key).unwrap_or_default();
                children
                    .literal
                    .insert(key.to_string(), child.with_handler(rest, handler));
            }
            Segment::Variable(pattern) => {
                match children.variable.iter_mut().find(|c| c.pattern == *pattern) {
                    Some(existing) => {
                        let child = std::mem::take(&mut existing.node);
                        existing.node = child.with_handler(rest, handler);
                    }
                    None => children.variable.push(VariableChild {
                        pattern: pattern.clone(),
                        node: HandlerNode::default().with_handler(rest, handler),
                    }),
                }
            }
        }
        Self::from_parts(children, handlers)
    }

    /// Push every bucket that fully consumes `segments` and serves `method`,
    /// in priority order: literal child first, then variable children.
    fn collect<'a>(
        &'a self,
        segments: &[&str],
        method: &Method,
        out: &mut Vec<&'a [Arc<Handler>]>,
    ) {
        let Some((first, rest)) = segments.split_first() else {
            if let Some(bucket) = self.handlers() {
                if bucket.iter().any(|h| h.method == *method) {
                    out.push(bucket);
                }
            }
            return;
        };
        let Some(children) = self.children() else {
            return;
        };

        if let Some(child) = children.literal.get(*first) {
            child.collect(rest, method, out);
        }
        for child in children.variable.iter().filter(|c| c.pattern.matches(first)) {
            child.node.collect(rest, method, out);
        }
    }

    fn count(&self) -> usize {
        let own = self.handlers().map_or(0, <[_]>::len);
        let below = self.children().map_or(0, |c| {
            c.literal.values().map(HandlerNode::count).sum::<usize>()
                + c.variable.iter().map(|v| v.node.count()).sum::<usize>()
        });
        own + below
    }
}

#[derive(Debug)]
enum Segment<'a> {
    Literal(&'a str),
    Variable(PathTemplate),
}

/// Split a path into segments, ignoring the leading `/` and one trailing `/`.
fn split_segments(path: &str) -> Vec<&str> {
    let routed = route_path(path);
    let trimmed = routed.strip_prefix('/').unwrap_or(routed);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

/// Path-indexed handler trie.
#[derive(Debug, Default)]
pub struct HandlerTrie {
    root: HandlerNode,
    len: usize,
}

impl HandlerTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under its path template.
    pub fn insert(&mut self, handler: Arc<Handler>) -> Result<(), TrieError> {
        let raw = handler.template.as_str().to_owned();
        let path = raw.split('?').next().unwrap_or(&raw);
        if !path.starts_with('/') {
            return Err(TrieError::MissingLeadingSlash(raw.to_string()));
        }

        let segments = split_segments(path)
            .into_iter()
            .map(|segment| {
                if !is_variable_segment(segment) {
                    return Ok(Segment::Literal(segment));
                }
                PathTemplate::parse(segment)
                    .map(Segment::Variable)
                    .map_err(|source| TrieError::InvalidSegment {
                        path: raw.to_string(),
                        segment: segment.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let root = std::mem::take(&mut self.root);
        self.root = root.with_handler(&segments, handler);
        self.len += 1;
        Ok(())
    }

    /// Every bucket that can serve `path` for `method`, best first.
    ///
    /// Any `?query` suffix on `path` is ignored.
    pub fn candidates(&self, method: &Method, path: &str) -> Vec<&[Arc<Handler>]> {
        let path = path.split('?').next().unwrap_or(path);
        let segments = split_segments(path);
        let mut buckets = Vec::new();
        self.root.collect(&segments, method, &mut buckets);
        buckets
    }

    /// The highest-priority bucket serving `path` for `method`, or an empty slice.
    pub fn lookup(&self, method: &Method, path: &str) -> &[Arc<Handler>] {
        self.candidates(method, path).first().copied().unwrap_or(&[])
    }

    /// Number of handlers inserted.
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.len, self.root.count());
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::test_support::handler;

    fn trie_with(handlers: &[(&str, Method, &str)]) -> HandlerTrie {
        let mut trie = HandlerTrie::new();
        for (name, method, path) in handlers {
            trie.insert(Arc::new(handler(name, method.clone(), path)))
                .unwrap();
        }
        trie
    }

    fn names(bucket: &[Arc<Handler>]) -> Vec<&str> {
        bucket.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn test_insert_and_lookup_literal() {
        let trie = trie_with(&[
            ("hello", Method::GET, "/hello"),
            ("world", Method::GET, "/hello/world"),
        ]);
        assert_eq!(trie.len(), 2);
        assert_eq!(names(trie.lookup(&Method::GET, "/hello")), vec!["hello"]);
        assert_eq!(names(trie.lookup(&Method::GET, "/hello/world")), vec!["world"]);
        assert_eq!(names(trie.lookup(&Method::GET, "/hello/")), vec!["hello"]);
        assert!(trie.lookup(&Method::GET, "/nothing").is_empty());
        assert!(trie.lookup(&Method::GET, "/hello/world/deeper").is_empty());
    }

    #[test]
    fn test_prefix_is_both_route_and_parent() {
        let trie = trie_with(&[
            ("users", Method::GET, "/users"),
            ("user", Method::GET, "/users/$$id$$"),
        ]);
        assert_eq!(names(trie.lookup(&Method::GET, "/users")), vec!["users"]);
        assert_eq!(names(trie.lookup(&Method::GET, "/users/9")), vec!["user"]);
    }

    #[test]
    fn test_root_path() {
        let trie = trie_with(&[("root", Method::GET, "/")]);
        assert_eq!(names(trie.lookup(&Method::GET, "/")), vec!["root"]);
        assert!(trie.lookup(&Method::GET, "/x").is_empty());
    }

    #[test]
    fn test_variable_fallback() {
        let trie = trie_with(&[
            ("special", Method::GET, "/items/special"),
            ("item", Method::GET, "/items/$$sku$$"),
            ("posts", Method::GET, "/users/$$id$$/posts"),
        ]);
        assert_eq!(names(trie.lookup(&Method::GET, "/items/special")), vec!["special"]);
        assert_eq!(names(trie.lookup(&Method::GET, "/items/abc123")), vec!["item"]);
        assert_eq!(names(trie.lookup(&Method::GET, "/users/42/posts")), vec!["posts"]);
        assert!(trie.lookup(&Method::GET, "/users/42").is_empty());
    }

    #[test]
    fn test_literal_branch_without_method_falls_back() {
        let trie = trie_with(&[
            ("special", Method::GET, "/items/special"),
            ("create", Method::POST, "/items/$$sku$$"),
        ]);
        assert_eq!(names(trie.lookup(&Method::POST, "/items/special")), vec!["create"]);
        assert!(trie.lookup(&Method::DELETE, "/items/special").is_empty());
    }

    #[test]
    fn test_candidates_in_priority_order() {
        let trie = trie_with(&[
            ("special", Method::GET, "/items/special"),
            ("item", Method::GET, "/items/$$sku$$"),
            ("named", Method::GET, "/items/$$name$$"),
        ]);
        let order: Vec<Vec<&str>> = trie
            .candidates(&Method::GET, "/items/special/")
            .into_iter()
            .map(names)
            .collect();
        assert_eq!(order, vec![vec!["special"], vec!["item"], vec!["named"]]);
        assert_eq!(trie.candidates(&Method::GET, "/items/other").len(), 2);
    }

    #[test]
    fn test_partial_segment_patterns() {
        let trie = trie_with(&[
            ("json", Method::GET, "/files/$$name$$.json"),
            ("xml", Method::GET, "/files/$$name$$.xml"),
        ]);
        assert_eq!(names(trie.lookup(&Method::GET, "/files/a.xml")), vec!["xml"]);
        assert_eq!(names(trie.lookup(&Method::GET, "/files/a.json")), vec!["json"]);
        assert!(trie.lookup(&Method::GET, "/files/a.txt").is_empty());
    }

    #[test]
    fn test_bucket_keeps_insertion_order() {
        let trie = trie_with(&[
            ("first", Method::GET, "/same"),
            ("second", Method::POST, "/same"),
            ("third", Method::GET, "/same"),
        ]);
        assert_eq!(
            names(trie.lookup(&Method::GET, "/same")),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn test_same_handler_twice() {
        let mut trie = HandlerTrie::new();
        let h = Arc::new(handler("dup", Method::GET, "/dup"));
        trie.insert(h.clone()).unwrap();
        trie.insert(h).unwrap();
        assert_eq!(trie.len(), 2);
        assert_eq!(names(trie.lookup(&Method::GET, "/dup")), vec!["dup", "dup"]);
    }

    #[test]
    fn test_query_suffix_is_ignored() {
        let trie = trie_with(&[("q", Method::GET, "/search?x=1")]);
        assert_eq!(names(trie.lookup(&Method::GET, "/search?y=2")), vec!["q"]);
    }

    #[test]
    fn test_insert_rejects_bad_paths() {
        let mut trie = HandlerTrie::new();
        let err = trie
            .insert(Arc::new(handler("bad", Method::GET, "relative")))
            .unwrap_err();
        assert_eq!(err, TrieError::MissingLeadingSlash("relative".into()));

        // A variable spanning two segments parses as a whole template only.
        let err = trie
            .insert(Arc::new(handler("span", Method::GET, "/a/$$x/y$$")))
            .unwrap_err();
        assert!(matches!(err, TrieError::InvalidSegment { .. }));
        assert!(trie.is_empty());
    }
}
