//! Matching engine.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, raw path, headers, client)
//!     → query.rs (split off and decode the query string)
//!     → trie.rs (segment lookup → bucket of candidates)
//!     → matcher.rs (method, Accept/Content-Type, query kinds)
//!     → template.rs (extract path variables for the winner)
//!     → Return: Matched { handler, path_vars, queries } or NotFound
//!
//! Trie construction (at startup):
//!     Handler[]
//!     → insert by path segment (literal or variable)
//!     → freeze inside an immutable Dispatcher
//! ```
//!
//! # Design Decisions
//! - Handlers indexed at startup, immutable at runtime
//! - Literal segments beat variable segments
//! - First registered compatible handler wins
//! - No regex anywhere in the hot path

pub mod dispatcher;
pub mod handler;
pub mod matcher;
pub mod mime;
pub mod query;
pub mod template;
pub mod trie;
pub mod value;

pub use dispatcher::{DispatchOutcome, Dispatcher, Match};
pub use handler::{callback, Callback, Handler, HandlerResponse, RequestContext};
pub use matcher::{RequestMatcher, RequestView};
pub use query::QueryMap;
pub use template::{PathTemplate, PathVars};
pub use trie::HandlerTrie;
pub use value::{ScalarValue, ValueKind};
