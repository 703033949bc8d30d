//! Named callbacks that descriptors refer to.
//!
//! Descriptors never carry code; they name a callback registered here before
//! startup. Three built-ins are always available:
//! - `static`: the canned response, unchanged
//! - `echo`: a JSON document describing the matched request
//! - `template`: the canned body with `{name}` placeholders filled in

use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::routing::{callback, Callback, HandlerResponse, RequestContext};

pub const STATIC: &str = "static";
pub const ECHO: &str = "echo";
pub const TEMPLATE: &str = "template";

/// Registry of callbacks available to descriptors.
#[derive(Clone)]
pub struct CallbackRegistry {
    callbacks: HashMap<String, Arc<dyn Callback>>,
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.callbacks.keys().collect();
        names.sort();
        f.debug_struct("CallbackRegistry")
            .field("callbacks", &names)
            .finish()
    }
}

impl CallbackRegistry {
    /// An empty registry, without the built-ins.
    pub fn empty() -> Self {
        Self {
            callbacks: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(STATIC, static_response);
        registry.register(ECHO, echo_response);
        registry.register(TEMPLATE, template_response);
        registry
    }

    /// Register (or replace) a callback under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&RequestContext<'_>) -> HandlerResponse + Send + Sync + 'static,
    {
        let name = name.into();
        if self.callbacks.insert(name.clone(), callback(f)).is_some() {
            tracing::debug!(callback = %name, "Callback replaced");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Callback>> {
        self.callbacks.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }
}

fn static_response(ctx: &RequestContext<'_>) -> HandlerResponse {
    ctx.response.clone()
}

fn echo_response(ctx: &RequestContext<'_>) -> HandlerResponse {
    let document = json!({
        "method": ctx.method.as_str(),
        "path": ctx.path,
        "client": ctx.client.to_string(),
        "queries": ctx.queries,
        "path_vars": ctx.path_vars,
    });
    let mut response = HandlerResponse::new(ctx.response.status);
    response.headers = ctx.response.headers.clone();
    if !has_header(&response, "content-type") {
        response = response.with_header("Content-Type", "application/json");
    }
    // Serializing a json! value cannot fail.
    response.with_body(serde_json::to_vec(&document).unwrap_or_default())
}

fn template_response(ctx: &RequestContext<'_>) -> HandlerResponse {
    let mut body = String::from_utf8_lossy(&ctx.response.body).into_owned();
    for (name, value) in ctx.path_vars.iter().chain(ctx.queries.iter()) {
        body = body.replace(&format!("{{{}}}", name), &value.to_string());
    }
    let mut response = ctx.response.clone();
    response.body = body.into_bytes();
    response
}

fn has_header(response: &HandlerResponse, name: &str) -> bool {
    response
        .headers
        .iter()
        .any(|(n, _)| n.eq_ignore_ascii_case(name))
}
