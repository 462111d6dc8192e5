//! Entity and field spec grammar: an optional operator character followed
//! by a name matching `[\w:-]+`.
//!
//! - `!name` names something literally.
//! - `#name` expands a tag.
//! - `$name` looks up an alias.
//! - a bare name is resolved by precedence rules.

use crate::error::{SchemaError, SchemaResult, SpecKind};
use regex_lite::Regex;
use std::sync::LazyLock;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w:-]+$").expect("name pattern is valid"));

/// Spec operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `!`
    Literal,
    /// `#`
    Tag,
    /// `$`
    Alias,
    /// No operator.
    Bare,
}

impl Operator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '!' => Some(Operator::Literal),
            '#' => Some(Operator::Tag),
            '$' => Some(Operator::Alias),
            _ => None,
        }
    }
}

/// A spec split into its operator and name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedSpec<'a> {
    pub operator: Operator,
    pub name: &'a str,
}

/// Parses one spec segment (no dots).
pub fn parse_spec(spec: &str, kind: SpecKind) -> SchemaResult<ParsedSpec<'_>> {
    let format_error = |reason: &str| SchemaError::Format {
        spec: spec.to_string(),
        kind,
        reason: reason.to_string(),
    };

    let Some(first) = spec.chars().next() else {
        return Err(format_error("empty spec"));
    };

    if NAME_RE.is_match(spec) {
        return Ok(ParsedSpec {
            operator: Operator::Bare,
            name: spec,
        });
    }

    let rest = &spec[first.len_utf8()..];
    if !NAME_RE.is_match(rest) {
        return Err(format_error("name must match [\\w:-]+"));
    }
    match Operator::from_char(first) {
        Some(operator) => Ok(ParsedSpec {
            operator,
            name: rest,
        }),
        None => Err(format_error(&format!("unknown operator {first:?}"))),
    }
}
