// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Value classification
//!
//! Classifies a single concrete value into the facets the guessing engine
//! queries: scalar kind, numeric-string and boolean-string detection,
//! date-like probing, list vs associative arrays, object capabilities.
//! Classification is a pure function of the value and the registry; nothing
//! is cached between calls.

use crate::registry::TypeRegistry;
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// Strings recognized as true: `1`, `true`, `yes`, `on`
pub const TRUE_STRINGS: [&str; 4] = ["1", "true", "yes", "on"];

/// Strings recognized as false: ``, `0`, `false`, `no`, `off`
pub const FALSE_STRINGS: [&str; 5] = ["", "0", "false", "no", "off"];

/// Match a string against the boolean-string table, case-insensitively and
/// ignoring surrounding whitespace
pub fn boolean_string(s: &str) -> Option<bool> {
    let s = s.trim().to_ascii_lowercase();

    if TRUE_STRINGS.contains(&s.as_str()) {
        Some(true)
    } else if FALSE_STRINGS.contains(&s.as_str()) {
        Some(false)
    } else {
        None
    }
}

// Optional sign, digits with an optional decimal point, optional exponent.
// The empty string is handled separately: it is numeric only for the leaf
// coercion step, never for classification.
static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("invalid numeric pattern")
});

/// Check if a string matches the numeric-string grammar
pub fn is_numeric_str(s: &str) -> bool {
    NUMERIC_RE.is_match(s.trim())
}

/// Try to interpret a string as a date or date-time. Numeric strings never
/// qualify; integers are not timestamps for guessing purposes.
pub fn parse_date_like(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if s.is_empty() || is_numeric_str(s) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}

/// Coarse kind of a classified value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    List,
    Assoc,
    Object,
    Resource,
}

/// Classification result exposing independent facets.
///
/// A string can be numeric and not boolean-like at the same time; consumers
/// query the facets separately instead of switching on one exclusive tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: ValueKind,
    /// Value is a number or a numeric string
    pub is_numeric: bool,
    /// Numeric value carries a fractional part (floats, strings with `.`)
    pub has_fraction: bool,
    /// String value appears in the boolean-string table
    pub is_boolean_like: bool,
    /// String value parses as a date or date-time
    pub is_date_like: bool,
    /// Value can be iterated element-by-element
    pub is_traversable: bool,
    /// Object value is an anonymous data bag
    pub is_data_bag: bool,
    /// Class name for object-like values
    pub class_name: Option<String>,
}

impl Classification {
    fn of_kind(kind: ValueKind) -> Self {
        Self {
            kind,
            is_numeric: false,
            has_fraction: false,
            is_boolean_like: false,
            is_date_like: false,
            is_traversable: false,
            is_data_bag: false,
            class_name: None,
        }
    }

    /// Check if the value is a scalar (boolean, integer, float or string)
    pub fn is_scalar(&self) -> bool {
        matches!(
            self.kind,
            ValueKind::Boolean | ValueKind::Integer | ValueKind::Float | ValueKind::String
        )
    }

    /// Check if the value is a sequential list array
    pub fn is_list(&self) -> bool {
        self.kind == ValueKind::List
    }

    /// Check if the value is an associative array
    pub fn is_assoc(&self) -> bool {
        self.kind == ValueKind::Assoc
    }
}

/// Classifier over the dynamic value model
///
/// Stateless with respect to classification calls; one instance can be
/// shared across threads.
#[derive(Debug, Clone)]
pub struct Classifier {
    registry: Arc<TypeRegistry>,
}

impl Classifier {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    /// Classify a value into its facets
    pub fn classify(&self, value: &Value) -> Classification {
        match value {
            Value::Null => Classification::of_kind(ValueKind::Null),
            Value::Boolean(_) => Classification::of_kind(ValueKind::Boolean),
            Value::Integer(_) => Classification {
                is_numeric: true,
                ..Classification::of_kind(ValueKind::Integer)
            },
            Value::Float(f) => Classification {
                is_numeric: true,
                has_fraction: f.fract() != 0.0,
                ..Classification::of_kind(ValueKind::Float)
            },
            Value::String(s) => {
                let is_numeric = is_numeric_str(s);
                Classification {
                    is_numeric,
                    has_fraction: is_numeric && s.contains('.'),
                    is_boolean_like: boolean_string(s).is_some(),
                    is_date_like: parse_date_like(s).is_some(),
                    ..Classification::of_kind(ValueKind::String)
                }
            }
            Value::Array(_) => Classification {
                is_traversable: true,
                ..Classification::of_kind(ValueKind::List)
            },
            Value::Map(_) => Classification {
                is_traversable: true,
                ..Classification::of_kind(ValueKind::Assoc)
            },
            Value::DateTime(_) => Classification {
                class_name: Some("DateTime".to_string()),
                ..Classification::of_kind(ValueKind::Object)
            },
            Value::Object(obj) => Classification {
                is_traversable: obj
                    .class
                    .as_deref()
                    .map_or(false, |class| self.registry.is_traversable(class)),
                is_data_bag: obj.is_bag(),
                class_name: obj.class.clone(),
                ..Classification::of_kind(ValueKind::Object)
            },
            Value::Resource(_) => Classification::of_kind(ValueKind::Resource),
        }
    }
}
