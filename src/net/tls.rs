//! TLS configuration and certificate loading.

use axum_server::tls_rustls::RustlsConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::TlsConfig;

/// Error type for TLS setup.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("{kind} file not found: {}", .path.display())]
    NotFound { kind: &'static str, path: PathBuf },

    #[error("failed to load certificate and key: {0}")]
    Load(#[from] std::io::Error),
}

/// Load the rustls configuration from PEM certificate and key files.
pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig, TlsError> {
    require_file("Certificate", &config.cert_path)?;
    require_file("Private key", &config.key_path)?;
    Ok(RustlsConfig::from_pem_file(&config.cert_path, &config.key_path).await?)
}

fn require_file(kind: &'static str, path: &Path) -> Result<(), TlsError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(TlsError::NotFound {
            kind,
            path: path.to_path_buf(),
        })
    }
}
