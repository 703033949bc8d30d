//! Media-type matching for `Accept` and `Content-Type` headers.
//!
//! # Responsibilities
//! - Parse a comma-separated media-range into a two-level map
//! - Decide whether a handler's template accepts a request's `Accept` value
//! - Decide whether a handler's template accepts a request's `Content-Type`
//!
//! # Design Decisions
//! - Tokens are lower-cased (media types are case-insensitive)
//! - `*` at either level is a wildcard; no q-value ordering
//! - Entries without a `/` are skipped rather than rejected

use std::collections::BTreeMap;

const WILDCARD: &str = "*";

/// Attribute attached to a secondary type after `;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaAttribute {
    /// A single `name=value` parameter, e.g. `q=0.9` or `charset=utf-8`.
    Param { name: String, value: String },
    /// Anything else after the `;`, kept verbatim.
    Raw(String),
}

impl MediaAttribute {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.split_once('=') {
            Some((name, value)) if !raw.contains(';') && !value.contains('=') => {
                Some(MediaAttribute::Param {
                    name: name.trim().to_ascii_lowercase(),
                    value: value.trim().to_string(),
                })
            }
            _ => Some(MediaAttribute::Raw(raw.to_string())),
        }
    }
}

/// Primary type → secondary type → optional attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaTypeMap {
    types: BTreeMap<String, BTreeMap<String, Option<MediaAttribute>>>,
}

impl MediaTypeMap {
    /// Parse a header value such as `text/html, application/*;q=0.8`.
    pub fn parse(header_value: &str) -> Self {
        let mut map = Self::default();
        for entry in header_value.split(',') {
            let Some((primary, rest)) = entry.split_once('/') else {
                continue;
            };
            let (secondary, attribute) = match rest.split_once(';') {
                Some((secondary, attribute)) => (secondary, MediaAttribute::parse(attribute)),
                None => (rest, None),
            };
            let primary = primary.trim().to_ascii_lowercase();
            let secondary = secondary.trim().to_ascii_lowercase();
            if primary.is_empty() || secondary.is_empty() {
                continue;
            }
            // First occurrence of a (primary, secondary) pair wins.
            map.types
                .entry(primary)
                .or_default()
                .entry(secondary)
                .or_insert(attribute);
        }
        map
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Number of (primary, secondary) pairs.
    pub fn len(&self) -> usize {
        self.types.values().map(BTreeMap::len).sum()
    }

    pub fn contains(&self, primary: &str, secondary: &str) -> bool {
        self.secondaries(primary)
            .is_some_and(|s| s.contains_key(secondary))
    }

    pub fn attribute(&self, primary: &str, secondary: &str) -> Option<&MediaAttribute> {
        self.secondaries(primary)?.get(secondary)?.as_ref()
    }

    fn secondaries(&self, primary: &str) -> Option<&BTreeMap<String, Option<MediaAttribute>>> {
        self.types.get(primary)
    }

    fn is_any(&self) -> bool {
        self.contains(WILDCARD, WILDCARD)
    }

    fn single_pair(&self) -> Option<(&str, &str)> {
        if self.len() != 1 {
            return None;
        }
        let (primary, secondaries) = self.types.iter().next()?;
        let secondary = secondaries.keys().next()?;
        Some((primary.as_str(), secondary.as_str()))
    }
}

/// Whether a handler declaring `template` can answer a client sending `Accept: request`.
pub fn accept_matches(template: &str, request: &str) -> bool {
    let template = MediaTypeMap::parse(template);
    let request = MediaTypeMap::parse(request);
    if request.is_empty() || template.is_empty() {
        return false;
    }
    if template.is_any() || request.is_any() {
        return true;
    }

    template.types.iter().any(|(primary, t_secondaries)| {
        let Some(r_secondaries) = request.secondaries(primary) else {
            return false;
        };
        t_secondaries.contains_key(WILDCARD)
            || r_secondaries.contains_key(WILDCARD)
            || t_secondaries.keys().any(|s| r_secondaries.contains_key(s))
    })
}

/// Whether a handler declaring `template` consumes a body sent as `Content-Type: request`.
pub fn content_type_matches(template: &str, request: &str) -> bool {
    let request = MediaTypeMap::parse(request);
    let Some((primary, secondary)) = request.single_pair() else {
        return false;
    };
    let template = MediaTypeMap::parse(template);
    if template.is_any() {
        return true;
    }
    template
        .secondaries(primary)
        .is_some_and(|s| s.contains_key(WILDCARD) || s.contains_key(secondary))
}
