//! Route path patterns with `{name}` placeholders.
//!
//! A pattern is split once into literal runs and placeholders:
//!
//! ```text
//! /user/{id}/posts/{slug:[a-z-]+}
//! ├─ "/user/"
//! ├─ {id}
//! ├─ "/posts/"
//! └─ {slug}  constraint ^(?:[a-z-]+)$
//! ```
//!
//! Substitution is strict: every placeholder needs a non-empty value, either
//! from the binding or from the route's fallback default. Binding keys that
//! match no placeholder are ignored.

use std::fmt;

use regex::Regex;

use crate::core::{ExpansionError, PatternError};

use super::VariableBinding;

/// A single `{name}` or `{name:regex}` placeholder.
#[derive(Debug, Clone)]
pub struct Placeholder {
    pub name: String,
    constraint: Option<(String, Regex)>,
}

impl Placeholder {
    /// Source text of the regex constraint, if any.
    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_ref().map(|(src, _)| src.as_str())
    }

    fn accepts(&self, value: &str) -> bool {
        self.constraint
            .as_ref()
            .is_none_or(|(_, regex)| regex.is_match(value))
    }
}

#[derive(Debug, Clone)]
enum Piece {
    Literal(String),
    Var(Placeholder),
}

/// Parsed route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw: String,
    pieces: Vec<Piece>,
}

impl RoutePattern {
    /// Parse a pattern string.
    ///
    /// Rejects patterns that do not start with `/`, have unbalanced braces,
    /// contain a `*` wildcard outside a constraint, or repeat a placeholder.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let raw = raw.trim();
        if !raw.starts_with('/') {
            return Err(PatternError::NotAbsolute(raw.to_string()));
        }

        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    let body = take_placeholder_body(&mut chars)
                        .ok_or_else(|| PatternError::Unbalanced(raw.to_string()))?;
                    let placeholder = parse_placeholder(raw, &body)?;
                    let duplicate = pieces.iter().any(
                        |p| matches!(p, Piece::Var(existing) if existing.name == placeholder.name),
                    );
                    if duplicate {
                        return Err(PatternError::DuplicateName {
                            pattern: raw.to_string(),
                            name: placeholder.name,
                        });
                    }
                    pieces.push(Piece::Var(placeholder));
                }
                '}' => return Err(PatternError::Unbalanced(raw.to_string())),
                '*' => return Err(PatternError::Wildcard(raw.to_string())),
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            pieces,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern has at least one placeholder.
    pub fn is_templated(&self) -> bool {
        self.placeholders().next().is_some()
    }

    /// Placeholders in declaration order.
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Var(v) => Some(v),
            Piece::Literal(_) => None,
        })
    }

    /// Substitute every placeholder with its bound value.
    ///
    /// `index` is the binding's position in the provider's result and only
    /// appears in error messages.
    pub fn expand(
        &self,
        binding: &VariableBinding,
        default: Option<&str>,
        index: usize,
    ) -> Result<String, ExpansionError> {
        let mut out = String::with_capacity(self.raw.len());
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Var(var) => {
                    let value = binding
                        .get(&var.name)
                        .map(String::as_str)
                        .filter(|v| !v.is_empty())
                        .or(default.filter(|d| !d.is_empty()))
                        .ok_or_else(|| ExpansionError::MissingBinding {
                            pattern: self.raw.clone(),
                            placeholder: var.name.clone(),
                            index,
                        })?;
                    if !var.accepts(value) {
                        return Err(ExpansionError::ConstraintMismatch {
                            pattern: self.raw.clone(),
                            placeholder: var.name.clone(),
                            value: value.to_string(),
                            constraint: var.constraint().unwrap_or_default().to_string(),
                        });
                    }
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Consume characters up to the `}` closing the current placeholder.
///
/// Braces inside a constraint (`{id:\d{3}}`) nest.
fn take_placeholder_body(chars: &mut std::str::Chars<'_>) -> Option<String> {
    let mut depth = 1usize;
    let mut body = String::new();
    for c in chars.by_ref() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(body);
                }
            }
            _ => {}
        }
        body.push(c);
    }
    None
}

fn parse_placeholder(pattern: &str, body: &str) -> Result<Placeholder, PatternError> {
    let (name, constraint) = match body.split_once(':') {
        Some((name, constraint)) => (name.trim(), Some(constraint.trim())),
        None => (body.trim(), None),
    };
    if name.is_empty() {
        return Err(PatternError::EmptyName(pattern.to_string()));
    }

    let constraint = constraint
        .filter(|c| !c.is_empty())
        .map(|src| {
            Regex::new(&format!("^(?:{src})$"))
                .map(|regex| (src.to_string(), regex))
                .map_err(|source| PatternError::Constraint {
                    pattern: pattern.to_string(),
                    name: name.to_string(),
                    source,
                })
        })
        .transpose()?;

    Ok(Placeholder {
        name: name.to_string(),
        constraint,
    })
}
