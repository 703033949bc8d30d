//! Startup orchestration.
//!
//! # Responsibilities
//! - Find descriptor files (directory scan or index file)
//! - Load, validate and build every handler
//! - Index the handlers into a [`Dispatcher`]
//!
//! # Design Decisions
//! - A bad descriptor is skipped with a warning
//! - Startup fails only when no handler at all could be registered

use std::path::PathBuf;
use thiserror::Error;

use crate::config::DescriptorConfig;
use crate::descriptor::{self, loader, CallbackRegistry, DescriptorError};
use crate::observability::metrics;
use crate::routing::Dispatcher;

/// Error type for startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("could not read descriptor source: {0}")]
    Source(#[source] DescriptorError),

    #[error("no handlers could be loaded from {}", .0.display())]
    NoHandlers(PathBuf),
}

/// Load every descriptor named by `config` into a dispatcher.
pub fn load_handlers(
    config: &DescriptorConfig,
    callbacks: &CallbackRegistry,
) -> Result<Dispatcher, StartupError> {
    let (source, files) = match &config.index {
        Some(index) => (index.clone(), loader::read_index(index)),
        None => (config.directory.clone(), loader::discover(&config.directory)),
    };
    let files = files.map_err(StartupError::Source)?;

    let mut handlers = Vec::with_capacity(files.len());
    for path in &files {
        let loaded = loader::load_descriptor(path).map_err(|e| ("load", e)).and_then(|d| {
            descriptor::build_handler(d, callbacks).map_err(|e| ("validate", e))
        });
        match loaded {
            Ok(handler) => handlers.push(handler),
            Err((stage, e)) => {
                tracing::warn!(file = %path.display(), error = %e, "Failed to load handler");
                metrics::record_descriptor_failure(stage);
            }
        }
    }

    let (dispatcher, skipped) = Dispatcher::from_handlers(handlers);
    for _ in 0..skipped {
        metrics::record_descriptor_failure("register");
    }

    let count = dispatcher.handler_count();
    metrics::record_handlers_loaded(count);
    if count == 0 {
        return Err(StartupError::NoHandlers(source));
    }

    tracing::info!(
        handlers = count,
        files = files.len(),
        source = %source.display(),
        "Handlers loaded"
    );
    Ok(dispatcher)
}
