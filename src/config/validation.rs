//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check that configured files and directories exist
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener address '{0}' is not a valid socket address")]
    InvalidListenAddress(String),

    #[error("metrics address '{0}' is not a valid socket address")]
    InvalidMetricsAddress(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("TLS {kind} file '{path}' does not exist")]
    MissingTlsFile { kind: &'static str, path: String },

    #[error("descriptor directory '{0}' does not exist")]
    MissingDescriptorDirectory(String),

    #[error("descriptor index '{0}' does not exist")]
    MissingDescriptorIndex(String),
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let listen = config.listener.socket_address();
    if listen.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidListenAddress(listen));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if let Some(tls) = &config.listener.tls {
        for (kind, path) in [("certificate", &tls.cert_path), ("key", &tls.key_path)] {
            if !path.is_file() {
                errors.push(ValidationError::MissingTlsFile {
                    kind,
                    path: path.display().to_string(),
                });
            }
        }
    }

    let descriptors = &config.descriptors;
    match &descriptors.index {
        Some(index) if !index.is_file() => errors.push(ValidationError::MissingDescriptorIndex(
            index.display().to_string(),
        )),
        Some(_) => {}
        None if !descriptors.directory.is_dir() => {
            errors.push(ValidationError::MissingDescriptorDirectory(
                descriptors.directory.display().to_string(),
            ))
        }
        None => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
