//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig
//!     → listener.rs (resolve and bind the TCP socket)
//!     → tls.rs (optional certificate loading)
//!     → Hand off to HTTP layer
//! ```

pub mod listener;
pub mod tls;

pub use listener::{bind, resolve, ListenerError};
pub use tls::{load_tls_config, TlsError};
