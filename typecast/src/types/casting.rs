// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Casting facade
//!
//! Entry point tying the classifier, the guessing engine and the coercer
//! together. Callers hand in a value and a type expression such as
//! `"integer|DateTime[]"`; the facade parses the union, picks the winning
//! type and coerces.

use crate::registry::TypeRegistry;
use crate::types::classify::is_numeric_str;
use crate::types::coercion::Coercer;
use crate::types::guess::{Guess, TypeGuess};
use crate::types::{join_tokens, CastError, CastResult, TypeToken};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// What to do when a cast cannot be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Return the error to the caller
    #[default]
    Raise,
    /// Log a warning and hand the original value back unchanged
    Warn,
}

/// Casts values to a type described by a union expression
#[derive(Debug, Clone)]
pub struct TypeCast {
    registry: Arc<TypeRegistry>,
    guess: TypeGuess,
    coercer: Coercer,
    aliases: HashMap<String, String>,
    policy: FailurePolicy,
}

impl TypeCast {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        let mut aliases = HashMap::new();
        aliases.insert("bool".to_string(), "boolean".to_string());
        aliases.insert("int".to_string(), "integer".to_string());

        Self {
            guess: TypeGuess::new(Arc::clone(&registry)),
            coercer: Coercer::new(Arc::clone(&registry)),
            registry,
            aliases,
            policy: FailurePolicy::Raise,
        }
    }

    /// Register an alias, e.g. `with_alias("ts", "DateTime")`
    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), target.into());
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Cast the value to the type named by `expr`, a `|`-separated union.
    pub fn cast(&self, value: &Value, expr: &str) -> CastResult<Value> {
        let tokens = self.parse_expr(expr)?;

        // Null never converts, whatever the union says
        if value.is_null() {
            return Ok(Value::Null);
        }

        if tokens.contains(&TypeToken::Mixed) {
            return Ok(value.clone());
        }

        // Null in a union only marks the value optional
        let tokens: Vec<TypeToken> = tokens
            .into_iter()
            .filter(|t| *t != TypeToken::Null)
            .collect();
        if tokens.is_empty() {
            return Ok(Value::Null);
        }

        if self.already_matches(value, &tokens) {
            return Ok(value.clone());
        }

        let outcome = if tokens.len() == 1 {
            self.coercer.coerce(value, &tokens[0])
        } else {
            self.cast_multiple(value, &tokens)
        };

        match (outcome, self.policy) {
            (Ok(result), _) => Ok(result),
            (Err(err), FailurePolicy::Raise) => Err(err),
            (Err(err), FailurePolicy::Warn) => {
                log::warn!("{}", err);
                Ok(value.clone())
            }
        }
    }

    fn cast_multiple(&self, value: &Value, tokens: &[TypeToken]) -> CastResult<Value> {
        match self.guess.resolve(value, tokens) {
            Some(Guess::One(token)) => self.coercer.coerce(value, &token),
            Some(Guess::ScalarOrArray { plain, element }) => {
                // Try the plain reading first, fall back to the typed list
                self.coercer.coerce(value, &plain).or_else(|_| {
                    self.coercer
                        .coerce(value, &TypeToken::ArrayOf(Box::new(element)))
                })
            }
            None => Err(CastError::Unguessable {
                value: value.describe(),
                types: join_tokens(tokens),
            }),
        }
    }

    fn parse_expr(&self, expr: &str) -> CastResult<Vec<TypeToken>> {
        let mut tokens: Vec<TypeToken> = Vec::new();
        for part in expr.split('|') {
            let part = part.trim();
            if part.is_empty() {
                return Err(CastError::UnknownType(expr.to_string()));
            }
            let token = TypeToken::parse(&self.normalize(part));
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        if tokens.is_empty() {
            return Err(CastError::UnknownType(expr.to_string()));
        }
        Ok(tokens)
    }

    /// Apply the alias table, recursing into `T[]` notation
    fn normalize(&self, name: &str) -> String {
        if let Some(inner) = name.strip_suffix("[]") {
            return format!("{}[]", self.normalize(inner.trim()));
        }
        match self.aliases.get(name) {
            Some(target) => target.clone(),
            None => name.to_string(),
        }
    }

    /// Whether the value already is one of the requested types, so the cast
    /// can pass it through untouched.
    ///
    /// A numeric string does not count as already matching `string` when the
    /// union also offers a numeric type: the guesser decides between the
    /// string and number readings, and numbers win for numeric values.
    fn already_matches(&self, value: &Value, tokens: &[TypeToken]) -> bool {
        let keep_guessing = matches!(value, Value::String(s) if is_numeric_str(s))
            && tokens
                .iter()
                .any(|t| matches!(t, TypeToken::Integer | TypeToken::Float));

        tokens.iter().any(|t| {
            if keep_guessing && *t == TypeToken::String {
                return false;
            }
            self.matches(value, t)
        })
    }

    fn matches(&self, value: &Value, token: &TypeToken) -> bool {
        match token {
            TypeToken::Mixed => true,
            TypeToken::Null => value.is_null(),
            TypeToken::String => matches!(value, Value::String(_)),
            TypeToken::Boolean => matches!(value, Value::Boolean(_)),
            TypeToken::Integer => matches!(value, Value::Integer(_)),
            TypeToken::Float => matches!(value, Value::Float(_)),
            TypeToken::Array => matches!(value, Value::Array(_) | Value::Map(_)),
            TypeToken::Object => matches!(value, Value::Object(_) | Value::DateTime(_)),
            TypeToken::Resource => matches!(value, Value::Resource(_)),
            TypeToken::Named(name) => self.registry.is_instance(value, name),
            TypeToken::ArrayOf(subtype) => match value {
                Value::Array(items) => items.iter().all(|item| self.matches(item, subtype)),
                _ => false,
            },
        }
    }
}
