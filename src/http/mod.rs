//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, fallback handler)
//!     → request.rs (request ID)
//!     → routing::Dispatcher (match handler, extract variables)
//!     → response.rs (HandlerResponse → HTTP response, or 404)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
