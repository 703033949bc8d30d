//! Descriptor validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the path template and its variable markers
//! - Check method tokens, media-type templates and status codes
//! - Check that the named callback is registered
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: descriptor + registry → Result<(), Vec<ValidationError>>

use axum::http::{header, Method};
use thiserror::Error;

use crate::descriptor::callbacks::CallbackRegistry;
use crate::descriptor::schema::HandlerDescriptor;
use crate::routing::mime::MediaTypeMap;
use crate::routing::template::{PathTemplate, TemplateError};

/// A single semantic problem in a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("path '{0}' does not start with '/'")]
    MissingLeadingSlash(String),

    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("variable '{0}' contains '/' and would span path segments")]
    VariableSpansSegments(String),

    #[error("'{0}' is not a valid HTTP method")]
    InvalidMethod(String),

    #[error("header '{name}' has no parseable media type in '{value}'")]
    InvalidMediaType { name: String, value: String },

    #[error("callback '{0}' is not registered")]
    UnknownCallback(String),

    #[error("status {0} is outside 100..=599")]
    InvalidStatus(u16),

    #[error("response declares both 'body' and 'json'")]
    ConflictingBody,
}

/// Validate a descriptor against the callbacks available at startup.
pub fn validate_descriptor(
    descriptor: &HandlerDescriptor,
    callbacks: &CallbackRegistry,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let path = strip_query(&descriptor.path);
    if !path.starts_with('/') {
        errors.push(ValidationError::MissingLeadingSlash(descriptor.path.clone()));
    }
    match PathTemplate::parse(path) {
        Ok(template) => errors.extend(
            template
                .variable_names()
                .filter(|name| name.contains('/'))
                .map(|name| ValidationError::VariableSpansSegments(name.to_string())),
        ),
        Err(e) => errors.push(e.into()),
    }

    if parse_method(&descriptor.method).is_none() {
        errors.push(ValidationError::InvalidMethod(descriptor.method.clone()));
    }

    for (name, value) in &descriptor.headers {
        let interpreted = name.eq_ignore_ascii_case(header::ACCEPT.as_str())
            || name.eq_ignore_ascii_case(header::CONTENT_TYPE.as_str());
        if interpreted && MediaTypeMap::parse(value).is_empty() {
            errors.push(ValidationError::InvalidMediaType {
                name: name.clone(),
                value: value.clone(),
            });
        }
    }

    if !callbacks.contains(&descriptor.callback) {
        errors.push(ValidationError::UnknownCallback(descriptor.callback.clone()));
    }

    let response = &descriptor.response;
    if !(100..=599).contains(&response.status) {
        errors.push(ValidationError::InvalidStatus(response.status));
    }
    if response.body.is_some() && response.json.is_some() {
        errors.push(ValidationError::ConflictingBody);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Methods are matched case-sensitively, so descriptors are normalised to upper case.
pub(crate) fn parse_method(raw: &str) -> Option<Method> {
    Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes()).ok()
}

/// The path without any `?query` suffix.
pub(crate) fn strip_query(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}
