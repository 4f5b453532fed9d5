// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Type system operational components
//!
//! This module provides the operational pieces of the coercion engine: the
//! type token model, value classification, the multi-type guessing engine,
//! the per-type coercer and the casting facade.

pub mod casting;
pub mod classify;
pub mod coercion;
pub mod guess;

use std::fmt;

pub use self::casting::{FailurePolicy, TypeCast};
pub use self::classify::{Classification, Classifier, ValueKind};
pub use self::coercion::Coercer;
pub use self::guess::{Guess, TypeGuess};

/// A single member of a requested type expression.
///
/// Primitive names parse case-insensitively; anything else is a named type
/// and compares case-sensitively. `T[]` parses to `ArrayOf`; one level of
/// nesting is meaningful, deeper nesting stays opaque inside the subtype.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeToken {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Object,
    Resource,
    Mixed,
    Null,
    Named(String),
    ArrayOf(Box<TypeToken>),
}

impl TypeToken {
    /// Parse a single type token (no `|` unions; the facade splits those)
    pub fn parse(s: &str) -> TypeToken {
        let s = s.trim();

        if let Some(subtype) = s.strip_suffix("[]") {
            return TypeToken::ArrayOf(Box::new(TypeToken::parse(subtype)));
        }

        match s.to_ascii_lowercase().as_str() {
            "string" => TypeToken::String,
            "integer" => TypeToken::Integer,
            "float" => TypeToken::Float,
            "boolean" => TypeToken::Boolean,
            "array" => TypeToken::Array,
            "object" => TypeToken::Object,
            "resource" => TypeToken::Resource,
            "mixed" => TypeToken::Mixed,
            "null" => TypeToken::Null,
            _ => TypeToken::Named(s.to_string()),
        }
    }

    /// The element type if this is a `T[]` form
    pub fn as_array_of(&self) -> Option<&TypeToken> {
        match self {
            TypeToken::ArrayOf(subtype) => Some(subtype),
            _ => None,
        }
    }

    /// Check if this token is one of the scalar primitives
    pub fn is_scalar_primitive(&self) -> bool {
        matches!(
            self,
            TypeToken::String | TypeToken::Integer | TypeToken::Float | TypeToken::Boolean
        )
    }

    /// Description with an article, used in diagnostic messages
    pub fn describe(&self) -> String {
        match self {
            TypeToken::Array => "an array".to_string(),
            TypeToken::Object => "an object".to_string(),
            TypeToken::Named(name) => format!("a {} object", name),
            TypeToken::ArrayOf(subtype) => format!("an array of {}", subtype),
            other => format!("a {}", other),
        }
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeToken::String => write!(f, "string"),
            TypeToken::Integer => write!(f, "integer"),
            TypeToken::Float => write!(f, "float"),
            TypeToken::Boolean => write!(f, "boolean"),
            TypeToken::Array => write!(f, "array"),
            TypeToken::Object => write!(f, "object"),
            TypeToken::Resource => write!(f, "resource"),
            TypeToken::Mixed => write!(f, "mixed"),
            TypeToken::Null => write!(f, "null"),
            TypeToken::Named(name) => write!(f, "{}", name),
            TypeToken::ArrayOf(subtype) => write!(f, "{}[]", subtype),
        }
    }
}

/// Join tokens back into a union expression for diagnostics
pub(crate) fn join_tokens(tokens: &[TypeToken]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join("|")
}

/// Errors for casting operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum CastError {
    #[error("Unable to guess the type of {value} for {types}")]
    Unguessable { value: String, types: String },

    #[error("Unable to cast {value} to {target}{}", .explain.as_ref().map(|e| format!(": {}", e)).unwrap_or_default())]
    NotCastable {
        value: String,
        target: String,
        explain: Option<String>,
    },

    #[error("Invalid type expression: {0}")]
    UnknownType(String),
}

/// Result type for casting operations
pub type CastResult<T> = Result<T, CastError>;
