//! Mock HTTP server library.
//!
//! Serves canned and computed responses for handlers declared in descriptor
//! files. Requests are matched on path template, method, headers and query
//! parameters.
//!
//! # Architecture Overview
//!
//! ```text
//!     descriptor files ──▶ descriptor ──▶ lifecycle::startup ──▶ routing::Dispatcher
//!                                                                      │
//!     Client Request ──▶ net ──▶ http::server ──▶ dispatch ◀───────────┘
//!                                     │
//!     Client Response ◀── http::response ◀── Handler callback
//!
//!     Cross-cutting: config, observability (logging + metrics), lifecycle (signals, shutdown)
//! ```

// Core subsystems
pub mod config;
pub mod descriptor;
pub mod http;
pub mod net;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ServerConfig;
pub use descriptor::CallbackRegistry;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{DispatchOutcome, Dispatcher, Handler, HandlerResponse};
