//! Path templates and path-variable extraction.
//!
//! A template such as `/users/$$id$$/posts` is decomposed into literal anchors
//! (`/users/`, `/posts`) and variable names (`id`). Extraction locates each
//! anchor in the concrete path, left to right, and binds the text between
//! consecutive anchors to the variable sitting between them.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::routing::value::ScalarValue;

/// Delimiter that frames a variable name on both sides.
pub const VARIABLE_MARKER: &str = "$$";

/// Extracted path variables, keyed by name.
pub type PathVars = BTreeMap<String, ScalarValue>;

/// Problems found while parsing a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template '{0}' has an unterminated '$$' variable marker")]
    UnbalancedMarker(String),

    #[error("template '{0}' declares a variable with an empty name")]
    EmptyName(String),

    #[error("template '{template}' declares variable '{name}' more than once")]
    DuplicateName { template: String, name: String },

    #[error("template '{template}' has variables '{left}' and '{right}' with no literal between them")]
    AdjacentVariables {
        template: String,
        left: String,
        right: String,
    },
}

/// Reasons a concrete path cannot be reconciled with a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("anchor '{anchor}' not found at or after offset {offset}")]
    AnchorNotFound { anchor: String, offset: usize },

    #[error("variable '{0}' captured an empty value")]
    EmptyValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Variable(String),
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    pieces: Vec<Piece>,
}

impl PathTemplate {
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let parts: Vec<&str> = raw.split(VARIABLE_MARKER).collect();
        // Markers come in pairs, so a well-formed split has an odd part count.
        if parts.len() % 2 == 0 {
            return Err(TemplateError::UnbalancedMarker(raw.to_string()));
        }

        let mut pieces = Vec::with_capacity(parts.len());
        for (idx, part) in parts.iter().enumerate() {
            if idx % 2 == 0 {
                if !part.is_empty() {
                    pieces.push(Piece::Literal(part.to_string()));
                }
                continue;
            }
            if part.is_empty() {
                return Err(TemplateError::EmptyName(raw.to_string()));
            }
            if let Some(Piece::Variable(left)) = pieces.last() {
                return Err(TemplateError::AdjacentVariables {
                    template: raw.to_string(),
                    left: left.clone(),
                    right: part.to_string(),
                });
            }
            let duplicate = pieces
                .iter()
                .any(|p| matches!(p, Piece::Variable(name) if name == part));
            if duplicate {
                return Err(TemplateError::DuplicateName {
                    template: raw.to_string(),
                    name: part.to_string(),
                });
            }
            pieces.push(Piece::Variable(part.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            pieces,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn has_variables(&self) -> bool {
        self.pieces.iter().any(|p| matches!(p, Piece::Variable(_)))
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Variable(name) => Some(name.as_str()),
            Piece::Literal(_) => None,
        })
    }

    /// Bind each variable to its substring of `path`.
    pub fn extract(&self, path: &str) -> Result<PathVars, ExtractError> {
        extract_pieces(&self.pieces, path)
    }

    /// Like [`PathTemplate::extract`], but one trailing `/` on either the
    /// template or `path` is ignored, the same way the trie routes.
    pub fn extract_route(&self, path: &str) -> Result<PathVars, ExtractError> {
        let path = route_path(path);
        match self.pieces.split_last() {
            Some((Piece::Literal(last), init)) if self.raw.len() > 1 && last.ends_with('/') => {
                let mut pieces = init.to_vec();
                let trimmed = &last[..last.len() - 1];
                if !trimmed.is_empty() {
                    pieces.push(Piece::Literal(trimmed.to_string()));
                }
                extract_pieces(&pieces, path)
            }
            _ => extract_pieces(&self.pieces, path),
        }
    }

    /// Whether `text` fits this template from its first byte to its last.
    ///
    /// Stricter than [`PathTemplate::extract`]: a leading literal must be a
    /// prefix and a trailing literal must be a suffix of `text`.
    pub fn matches(&self, text: &str) -> bool {
        if let Some(Piece::Literal(first)) = self.pieces.first() {
            if !text.starts_with(first.as_str()) {
                return false;
            }
        }
        if let Some(Piece::Literal(last)) = self.pieces.last() {
            if !text.ends_with(last.as_str()) {
                return false;
            }
        }
        if !self.has_variables() {
            return text == self.raw;
        }
        self.extract(text).is_ok()
    }
}

fn extract_pieces(pieces: &[Piece], path: &str) -> Result<PathVars, ExtractError> {
    let mut vars = PathVars::new();
    if !pieces.iter().any(|p| matches!(p, Piece::Variable(_))) {
        return Ok(vars);
    }

    let mut cursor = 0;
    let mut pending: Option<&str> = None;
    for piece in pieces {
        match piece {
            Piece::Literal(anchor) => {
                let start = path
                    .get(cursor..)
                    .and_then(|rest| rest.find(anchor.as_str()))
                    .map(|found| cursor + found)
                    .ok_or_else(|| ExtractError::AnchorNotFound {
                        anchor: anchor.clone(),
                        offset: cursor,
                    })?;
                if let Some(name) = pending.take() {
                    bind(&mut vars, name, &path[cursor..start])?;
                }
                cursor = start + anchor.len();
            }
            Piece::Variable(name) => pending = Some(name),
        }
    }
    if let Some(name) = pending {
        bind(&mut vars, name, &path[cursor..])?;
    }
    Ok(vars)
}

fn bind(vars: &mut PathVars, name: &str, raw: &str) -> Result<(), ExtractError> {
    if raw.is_empty() {
        return Err(ExtractError::EmptyValue(name.to_string()));
    }
    vars.insert(name.to_string(), ScalarValue::parse_literal(raw));
    Ok(())
}

/// `path` without one trailing `/`; the root path stays `/`.
pub fn route_path(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}

/// Whether a single path segment declares a variable.
pub fn is_variable_segment(segment: &str) -> bool {
    segment.contains(VARIABLE_MARKER)
}
