//! Declarative handler descriptors.
//!
//! # Data Flow
//! ```text
//! descriptor files (*.handler.toml / *.handler.json)
//!     → loader.rs (discover in a directory or read an index file, parse)
//!     → validation.rs (semantic checks against the callback registry)
//!     → build_handler (resolve callback, render canned response)
//!     → Handler (immutable, ready for the trie)
//! ```
//!
//! # Design Decisions
//! - Descriptors are data only; behaviour comes from named callbacks
//! - A broken descriptor is skipped with a warning, never fatal on its own

pub mod callbacks;
pub mod loader;
pub mod schema;
pub mod validation;

pub use callbacks::CallbackRegistry;
pub use loader::{load_descriptor, DescriptorError};
pub use schema::{HandlerDescriptor, ResponseDescriptor};
pub use validation::{validate_descriptor, ValidationError};

use crate::routing::{Handler, HandlerResponse, PathTemplate};
use validation::{parse_method, strip_query};

/// Validate `descriptor` and turn it into a [`Handler`].
pub fn build_handler(
    descriptor: HandlerDescriptor,
    callbacks: &CallbackRegistry,
) -> Result<Handler, DescriptorError> {
    let name = descriptor
        .name
        .clone()
        .unwrap_or_else(|| descriptor.path.clone());
    let invalid = |errors: Vec<ValidationError>| DescriptorError::Validation {
        name: name.clone(),
        errors,
    };

    validate_descriptor(&descriptor, callbacks).map_err(invalid)?;

    let template = PathTemplate::parse(strip_query(&descriptor.path))
        .map_err(|e| invalid(vec![e.into()]))?;
    let method = parse_method(&descriptor.method)
        .ok_or_else(|| invalid(vec![ValidationError::InvalidMethod(descriptor.method.clone())]))?;
    let callback = callbacks
        .get(&descriptor.callback)
        .ok_or_else(|| invalid(vec![ValidationError::UnknownCallback(descriptor.callback.clone())]))?;
    let response = render_response(&descriptor.response);

    Ok(Handler {
        name: name.clone(),
        template,
        method,
        headers: descriptor.headers,
        queries: descriptor.queries,
        response,
        callback,
    })
}

fn render_response(descriptor: &ResponseDescriptor) -> HandlerResponse {
    let mut response = HandlerResponse::new(descriptor.status);
    for (name, value) in &descriptor.headers {
        response = response.with_header(name.as_str(), value.as_str());
    }

    if let Some(json) = &descriptor.json {
        let declared = descriptor
            .headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case("content-type"));
        if !declared {
            response = response.with_header("Content-Type", "application/json");
        }
        // A serde_json::Value always serializes.
        response = response.with_body(serde_json::to_vec(json).unwrap_or_default());
    } else if let Some(body) = &descriptor.body {
        response = response.with_body(body.as_bytes());
    }
    response
}
