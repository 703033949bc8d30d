//! TCP listener binding.

use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("invalid listen address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// The socket address described by `config`.
pub fn resolve(config: &ListenerConfig) -> Result<SocketAddr, ListenerError> {
    let address = config.socket_address();
    address
        .parse()
        .map_err(|source| ListenerError::Address { address, source })
}

/// Bind a TCP listener for `config`. Port 0 picks an ephemeral port.
pub async fn bind(config: &ListenerConfig) -> Result<TcpListener, ListenerError> {
    let address = resolve(config)?;
    let listener = TcpListener::bind(address)
        .await
        .map_err(|source| ListenerError::Bind { address, source })?;

    if let Ok(local) = listener.local_addr() {
        tracing::info!(address = %local, "Listening for connections");
    }
    Ok(listener)
}
