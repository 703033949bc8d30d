//! Handler descriptor definitions.
//!
//! A descriptor is plain data: where a handler lives, what it accepts, which
//! registered callback answers it, and the canned response that callback may
//! use. All types derive Serde traits for loading from TOML or JSON files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::routing::ValueKind;

/// One handler, as authored in a descriptor file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HandlerDescriptor {
    /// Identifier for logs. Defaults to the descriptor's file stem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Path template, e.g. `/users/$$id$$/posts`.
    pub path: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Name of a registered callback (default: `static`).
    #[serde(default = "default_callback")]
    pub callback: String,

    /// Header name → media-type template.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Query parameter name → expected value kind.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub queries: BTreeMap<String, ValueKind>,

    /// Canned response handed to the callback.
    #[serde(default)]
    pub response: ResponseDescriptor,
}

/// Canned response for a handler.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseDescriptor {
    /// Status code (default: 200).
    pub status: u16,

    /// Response headers.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// Raw text body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// JSON body; sets `Content-Type: application/json` unless given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<serde_json::Value>,
}

impl Default for ResponseDescriptor {
    fn default() -> Self {
        Self {
            status: 200,
            headers: BTreeMap::new(),
            body: None,
            json: None,
        }
    }
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_callback() -> String {
    "static".to_string()
}
