// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Multi-type resolution engine
//!
//! Given a value and an ordered set of candidate types, narrows the
//! candidates down through successive elimination stages to at most one
//! concrete type. The pipeline never fails: it concludes with a single
//! guess, a scalar-or-array composite, or `None` when nothing applies or
//! the remaining candidates are indistinguishable.
//!
//! Every stage is a pure filter over the candidate set, so the final answer
//! does not depend on the order of the requested union.

use crate::registry::TypeRegistry;
use crate::types::classify::{Classification, Classifier, ValueKind};
use crate::types::TypeToken;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Outcome of a successful resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Guess {
    /// A single concrete type
    One(TypeToken),
    /// Two candidates remained and exactly one of them is a traversable
    /// named type: treat the value as `plain`, or wrap it into an array of
    /// `element`. The non-traversable half always renders first.
    ScalarOrArray {
        plain: TypeToken,
        element: TypeToken,
    },
}

impl fmt::Display for Guess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guess::One(token) => write!(f, "{}", token),
            Guess::ScalarOrArray { plain, element } => write!(f, "{}|{}[]", plain, element),
        }
    }
}

/// Type guessing engine
///
/// Holds only the registry and classifier; all working state is local to one
/// `resolve` call, so a single instance can serve concurrent resolutions.
#[derive(Debug, Clone)]
pub struct TypeGuess {
    registry: Arc<TypeRegistry>,
    classifier: Classifier,
}

impl TypeGuess {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        let classifier = Classifier::new(Arc::clone(&registry));
        Self {
            registry,
            classifier,
        }
    }

    /// Resolve a candidate set against a value.
    ///
    /// A single-candidate set is returned as-is without validation: the
    /// engine trusts the caller to have meant that type. `None` covers both
    /// "no candidate applies" and "several apply and none is more specific";
    /// the caller reports the same diagnostic for either.
    pub fn resolve(&self, value: &Value, candidates: &[TypeToken]) -> Option<Guess> {
        let mut set: Vec<TypeToken> = candidates.to_vec();

        // Stage 1: null in a union only signals optionality
        set.retain(|t| *t != TypeToken::Null);

        if set.is_empty() {
            return None;
        }
        if set.len() == 1 {
            return set.pop().map(Guess::One);
        }

        let class = self.classifier.classify(value);
        let original_len = set.len();

        set = self.possible_types(value, &class, set);
        set = self.reduce_scalars(&class, set);
        set = self.reduce_element_types(value, &class, set);

        match self.resolve_duality(value, &class, set, original_len) {
            Duality::Resolved(guess) => return Some(guess),
            Duality::Continue(remaining) => set = remaining,
        }

        set = self.remove_supertypes(&class, set);

        self.conclude(set)
    }

    /// Stage 2: structural-compatibility filter.
    ///
    /// When every candidate gets eliminated the original set is returned
    /// unchanged; over-elimination from a misfiring heuristic must not turn
    /// a guessable value into a dead end.
    fn possible_types(
        &self,
        value: &Value,
        class: &Classification,
        set: Vec<TypeToken>,
    ) -> Vec<TypeToken> {
        let filtered: Vec<TypeToken> = match class.kind {
            ValueKind::Boolean | ValueKind::Integer | ValueKind::Float | ValueKind::String => set
                .iter()
                .filter(|t| self.possible_for_scalar(class, t))
                .cloned()
                .collect(),
            ValueKind::List => set
                .iter()
                .filter(|t| self.possible_for_list(t))
                .cloned()
                .collect(),
            ValueKind::Assoc => set
                .iter()
                .filter(|t| self.possible_for_assoc(t))
                .cloned()
                .collect(),
            ValueKind::Object if class.is_data_bag => set
                .iter()
                .filter(|t| self.possible_for_assoc(t))
                .cloned()
                .collect(),
            ValueKind::Object => set
                .iter()
                .filter(|t| self.possible_for_object(value, class, t))
                .cloned()
                .collect(),
            ValueKind::Resource => set
                .iter()
                .filter(|t| matches!(t, TypeToken::Resource | TypeToken::Mixed))
                .cloned()
                .collect(),
            ValueKind::Null => set.clone(),
        };

        if filtered.is_empty() {
            set
        } else {
            filtered
        }
    }

    fn possible_for_scalar(&self, class: &Classification, token: &TypeToken) -> bool {
        match token {
            TypeToken::String | TypeToken::Mixed => true,
            TypeToken::Integer => {
                class.kind == ValueKind::Integer
                    || class.kind == ValueKind::Boolean
                    || (class.kind == ValueKind::Float && !class.has_fraction)
                    || (class.kind == ValueKind::String && class.is_numeric)
            }
            TypeToken::Float => {
                matches!(
                    class.kind,
                    ValueKind::Float | ValueKind::Integer | ValueKind::Boolean
                ) || (class.kind == ValueKind::String && class.is_numeric)
            }
            TypeToken::Boolean => class.kind == ValueKind::Boolean || class.is_boolean_like,
            TypeToken::Named(name) => {
                self.registry.is_date_like(name)
                    && class.kind == ValueKind::String
                    && class.is_date_like
            }
            TypeToken::Array
            | TypeToken::Object
            | TypeToken::Resource
            | TypeToken::Null
            | TypeToken::ArrayOf(_) => false,
        }
    }

    fn possible_for_list(&self, token: &TypeToken) -> bool {
        match token {
            TypeToken::Array | TypeToken::ArrayOf(_) | TypeToken::Mixed => true,
            TypeToken::Named(name) => self.registry.is_traversable(name),
            _ => false,
        }
    }

    fn possible_for_assoc(&self, token: &TypeToken) -> bool {
        match token {
            TypeToken::Array | TypeToken::Object | TypeToken::Mixed => true,
            // An associative structure is not a homogeneous list
            TypeToken::ArrayOf(_) => false,
            TypeToken::Named(name) => !self.registry.is_date_like(name),
            _ => false,
        }
    }

    fn possible_for_object(
        &self,
        value: &Value,
        class: &Classification,
        token: &TypeToken,
    ) -> bool {
        match token {
            TypeToken::Named(name) => self.registry.is_instance(value, name),
            TypeToken::String => class
                .class_name
                .as_deref()
                .map_or(false, |name| self.registry.is_stringable(name)),
            // A traversable object stays castable to a plain or typed array
            // until the final stage
            TypeToken::Array | TypeToken::ArrayOf(_) => class.is_traversable,
            TypeToken::Object => class.is_data_bag,
            TypeToken::Mixed => true,
            _ => false,
        }
    }

    /// Stage 3: reduce competing scalar candidates.
    fn reduce_scalars(&self, class: &Classification, mut set: Vec<TypeToken>) -> Vec<TypeToken> {
        if !class.is_scalar() || set.len() < 2 {
            return set;
        }

        let has = |set: &[TypeToken], wanted: &TypeToken| set.contains(wanted);
        let has_date_named = |set: &[TypeToken]| {
            set.iter().any(|t| match t {
                TypeToken::Named(name) => self.registry.is_date_like(name),
                _ => false,
            })
        };

        // A date string prefers the date type over plain string
        if class.kind == ValueKind::String
            && class.is_date_like
            && has_date_named(&set)
            && has(&set, &TypeToken::String)
        {
            set.retain(|t| *t != TypeToken::String);
        }

        // Integers are not treated as timestamps
        if has_date_named(&set) && has(&set, &TypeToken::Integer) {
            set.retain(|t| match t {
                TypeToken::Named(name) => !self.registry.is_date_like(name),
                _ => true,
            });
        }

        if class.kind == ValueKind::Boolean && has(&set, &TypeToken::Boolean) {
            // The exact type wins over everything it could be coerced to
            set.retain(|t| {
                !matches!(t, TypeToken::Integer | TypeToken::Float | TypeToken::String)
            });
        } else if (has(&set, &TypeToken::Integer) || has(&set, &TypeToken::Float))
            && (class.is_numeric || class.kind == ValueKind::Boolean)
        {
            // Numeric-looking values prefer numeric types
            set.retain(|t| !matches!(t, TypeToken::Boolean | TypeToken::String));
        }

        if has(&set, &TypeToken::Integer) && has(&set, &TypeToken::Float) {
            let wants_float =
                class.kind == ValueKind::Float || (class.kind == ValueKind::String && class.has_fraction);
            if wants_float {
                set.retain(|t| *t != TypeToken::Integer);
            } else {
                set.retain(|t| *t != TypeToken::Float);
            }
        }

        // A boolean-like string is still a string: boolean only outranks
        // string for native bool values
        if class.kind == ValueKind::String
            && has(&set, &TypeToken::String)
            && has(&set, &TypeToken::Boolean)
        {
            set.retain(|t| *t != TypeToken::Boolean);
        }

        set
    }

    /// Stage 4: reduce competing `T[]` candidates for a list value,
    /// mirroring the scalar precedence rules quantified over the elements.
    fn reduce_element_types(
        &self,
        value: &Value,
        class: &Classification,
        mut set: Vec<TypeToken>,
    ) -> Vec<TypeToken> {
        if class.kind != ValueKind::List || set.contains(&TypeToken::Array) {
            return set;
        }
        if set.iter().filter(|t| t.as_array_of().is_some()).count() < 2 {
            return set;
        }

        let items = match value.as_array() {
            Some(items) => items,
            None => return set,
        };
        let elements: Vec<Classification> =
            items.iter().map(|item| self.classifier.classify(item)).collect();

        let all_numeric = !elements.is_empty()
            && elements
                .iter()
                .all(|e| e.is_numeric || e.kind == ValueKind::Boolean);
        let any_fraction = elements.iter().any(|e| e.has_fraction);
        let all_date_like = !elements.is_empty()
            && elements
                .iter()
                .all(|e| e.is_date_like || e.class_name.as_deref() == Some("DateTime"));
        let all_bool = !elements.is_empty() && elements.iter().all(|e| e.kind == ValueKind::Boolean);
        let all_strings = !elements.is_empty() && elements.iter().all(|e| e.kind == ValueKind::String);

        let has_sub = |set: &[TypeToken], wanted: &TypeToken| {
            set.iter().any(|t| t.as_array_of() == Some(wanted))
        };
        let has_date_sub = |set: &[TypeToken]| {
            set.iter().any(|t| match t.as_array_of() {
                Some(TypeToken::Named(name)) => self.registry.is_date_like(name),
                _ => false,
            })
        };
        let drop_sub = |set: &mut Vec<TypeToken>, unwanted: &TypeToken| {
            set.retain(|t| t.as_array_of() != Some(unwanted));
        };
        let drop_date_sub = |set: &mut Vec<TypeToken>| {
            set.retain(|t| match t.as_array_of() {
                Some(TypeToken::Named(name)) => !self.registry.is_date_like(name),
                _ => true,
            });
        };

        // Date elements prefer the date type over string, but only when the
        // whole list qualifies
        if has_date_sub(&set) && has_sub(&set, &TypeToken::String) {
            if all_date_like {
                drop_sub(&mut set, &TypeToken::String);
            } else {
                drop_date_sub(&mut set);
            }
        }

        // All-numeric lists are not lists of timestamps; a single
        // non-numeric element flips the list to the date type instead
        if has_date_sub(&set) && has_sub(&set, &TypeToken::Integer) {
            if all_numeric {
                drop_date_sub(&mut set);
            } else {
                drop_sub(&mut set, &TypeToken::Integer);
            }
        }

        if all_bool && has_sub(&set, &TypeToken::Boolean) {
            drop_sub(&mut set, &TypeToken::Integer);
            drop_sub(&mut set, &TypeToken::Float);
            drop_sub(&mut set, &TypeToken::String);
        } else if has_sub(&set, &TypeToken::Integer) || has_sub(&set, &TypeToken::Float) {
            if all_numeric {
                drop_sub(&mut set, &TypeToken::Boolean);
                drop_sub(&mut set, &TypeToken::String);
            } else {
                // Some element cannot be a number; keep numeric candidates
                // only if nothing else survives
                let others: Vec<TypeToken> = set
                    .iter()
                    .filter(|t| {
                        !matches!(
                            t.as_array_of(),
                            Some(TypeToken::Integer) | Some(TypeToken::Float)
                        )
                    })
                    .cloned()
                    .collect();
                if !others.is_empty() {
                    set = others;
                }
            }
        }

        if has_sub(&set, &TypeToken::Integer) && has_sub(&set, &TypeToken::Float) {
            if any_fraction {
                drop_sub(&mut set, &TypeToken::Integer);
            } else {
                drop_sub(&mut set, &TypeToken::Float);
            }
        }

        // Boolean-like strings stay strings, as in the scalar stage
        if all_strings && has_sub(&set, &TypeToken::String) && has_sub(&set, &TypeToken::Boolean) {
            drop_sub(&mut set, &TypeToken::Boolean);
        }

        set
    }

    /// Stage 5: resolve array/scalar duality for non-array values.
    fn resolve_duality(
        &self,
        value: &Value,
        class: &Classification,
        mut set: Vec<TypeToken>,
        original_len: usize,
    ) -> Duality {
        let applies = (class.is_scalar() || class.kind == ValueKind::Object) && set.len() >= 2;
        if !applies {
            return Duality::Continue(set);
        }

        if set.contains(&TypeToken::Array) {
            // Plain array beats typed-array forms for non-array values
            set.retain(|t| t.as_array_of().is_none());
            return Duality::Continue(set);
        }

        let all_array_of = set.iter().all(|t| t.as_array_of().is_some());
        if all_array_of && set.len() == original_len {
            // Nothing fit structurally except wrapping the value as a
            // single-element list: resolve the bare subtypes instead
            let subtypes: Vec<TypeToken> = set
                .iter()
                .filter_map(|t| t.as_array_of().cloned())
                .collect();

            if let Some(Guess::One(winner)) = self.resolve(value, &subtypes) {
                return Duality::Resolved(Guess::One(TypeToken::ArrayOf(Box::new(winner))));
            }
        }

        Duality::Continue(set)
    }

    /// Stage 6: between related named types, the most derived one wins.
    fn remove_supertypes(&self, class: &Classification, set: Vec<TypeToken>) -> Vec<TypeToken> {
        if class.kind != ValueKind::Object {
            return set;
        }

        let names: Vec<String> = set
            .iter()
            .filter_map(|t| match t {
                TypeToken::Named(name) => Some(name.clone()),
                _ => None,
            })
            .collect();
        if names.len() < 2 {
            return set;
        }

        set.into_iter()
            .filter(|t| match t {
                TypeToken::Named(name) => !names
                    .iter()
                    .any(|other| other != name && self.registry.is_subtype(other, name)),
                _ => true,
            })
            .collect()
    }

    /// Stage 7: conclude.
    fn conclude(&self, mut set: Vec<TypeToken>) -> Option<Guess> {
        match set.len() {
            0 => None,
            1 => set.pop().map(Guess::One),
            2 => {
                let traversable = |t: &TypeToken| match t {
                    TypeToken::Named(name) => self.registry.is_traversable(name),
                    _ => false,
                };
                let wrappable = |t: &TypeToken| {
                    !matches!(t, TypeToken::Array | TypeToken::ArrayOf(_))
                };

                match (traversable(&set[0]), traversable(&set[1])) {
                    (false, true) if wrappable(&set[0]) => Some(Guess::ScalarOrArray {
                        plain: set[0].clone(),
                        element: set[1].clone(),
                    }),
                    (true, false) if wrappable(&set[1]) => Some(Guess::ScalarOrArray {
                        plain: set[1].clone(),
                        element: set[0].clone(),
                    }),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

enum Duality {
    Resolved(Guess),
    Continue(Vec<TypeToken>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeInfo;

    fn engine() -> TypeGuess {
        TypeGuess::new(Arc::new(TypeRegistry::new()))
    }

    fn tokens(names: &[&str]) -> Vec<TypeToken> {
        names.iter().map(|s| TypeToken::parse(s)).collect()
    }

    #[test]
    fn test_singleton_is_trusted() {
        // No structural validation for a single candidate
        let guess = engine().resolve(&Value::from("10"), &tokens(&["array"]));
        assert_eq!(guess, Some(Guess::One(TypeToken::Array)));
    }

    #[test]
    fn test_null_token_is_stripped() {
        let guess = engine().resolve(&Value::from("10"), &tokens(&["integer", "null"]));
        assert_eq!(guess, Some(Guess::One(TypeToken::Integer)));
    }

    #[test]
    fn test_empty_candidates() {
        assert_eq!(engine().resolve(&Value::Integer(1), &[]), None);
        assert_eq!(engine().resolve(&Value::Integer(1), &tokens(&["null"])), None);
    }

    #[test]
    fn test_safety_valve_keeps_original_set() {
        // Neither candidate survives the structural filter; stage 5 then
        // resolves the wrapped subtypes instead of giving up
        let guess = engine().resolve(&Value::Integer(10), &tokens(&["string[]", "integer[]"]));
        assert_eq!(guess, Some(Guess::One(TypeToken::parse("integer[]"))));
    }

    #[test]
    fn test_native_bool_wins() {
        let guess = engine().resolve(&Value::Boolean(true), &tokens(&["integer", "boolean"]));
        assert_eq!(guess, Some(Guess::One(TypeToken::Boolean)));
    }

    #[test]
    fn test_boolean_like_string_stays_string() {
        let guess = engine().resolve(&Value::from("on"), &tokens(&["string", "boolean"]));
        assert_eq!(guess, Some(Guess::One(TypeToken::String)));
    }

    #[test]
    fn test_boolean_like_string_beats_non_viable_integer() {
        let guess = engine().resolve(&Value::from("on"), &tokens(&["integer", "boolean"]));
        assert_eq!(guess, Some(Guess::One(TypeToken::Boolean)));
    }

    #[test]
    fn test_scalar_or_array_composite() {
        let mut registry = TypeRegistry::new();
        registry.register("Foo", TypeInfo::default());
        registry.register(
            "Bag",
            TypeInfo {
                traversable: true,
                ..Default::default()
            },
        );
        let engine = TypeGuess::new(Arc::new(registry));

        let value = Value::Object(crate::value::ObjectValue::bag(Default::default()));
        let guess = engine.resolve(&value, &tokens(&["Foo", "Bag"]));
        assert_eq!(
            guess,
            Some(Guess::ScalarOrArray {
                plain: TypeToken::parse("Foo"),
                element: TypeToken::parse("Bag"),
            })
        );
        // Deterministic rendering: non-traversable half first
        assert_eq!(guess.map(|g| g.to_string()), Some("Foo|Bag[]".to_string()));
    }

    #[test]
    fn test_composite_order_independence() {
        let mut registry = TypeRegistry::new();
        registry.register("Foo", TypeInfo::default());
        registry.register(
            "Bag",
            TypeInfo {
                traversable: true,
                ..Default::default()
            },
        );
        let engine = TypeGuess::new(Arc::new(registry));
        let value = Value::Object(crate::value::ObjectValue::bag(Default::default()));

        let forward = engine.resolve(&value, &tokens(&["Foo", "Bag"]));
        let reverse = engine.resolve(&value, &tokens(&["Bag", "Foo"]));
        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_unrelated_candidates_are_ambiguous() {
        let guess = engine().resolve(
            &Value::from("hello"),
            &tokens(&["integer[]", "boolean[]", "object"]),
        );
        assert_eq!(guess, None);
    }
}
