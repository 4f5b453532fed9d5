// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Dynamic value model for runtime type coercion
//!
//! Supports the value shapes the guessing engine distinguishes:
//! - Scalars: Boolean, Integer, Float, String, Null
//! - Temporal: DateTime
//! - Containers: Array (sequential list), Map (associative)
//! - Objects: anonymous data bags and instances of registered named types
//! - Resources: opaque handles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An object value: either an anonymous data bag (`class: None`) or an
/// instance of a named type known to the `TypeRegistry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectValue {
    pub class: Option<String>,
    pub fields: BTreeMap<String, Value>,
}

impl ObjectValue {
    /// Create an anonymous data-bag object
    pub fn bag(fields: BTreeMap<String, Value>) -> Self {
        Self {
            class: None,
            fields,
        }
    }

    /// Create an instance of a named type
    pub fn instance(class: impl Into<String>, fields: BTreeMap<String, Value>) -> Self {
        Self {
            class: Some(class.into()),
            fields,
        }
    }

    /// Check if this object is an anonymous data bag
    pub fn is_bag(&self) -> bool {
        self.class.is_none()
    }
}

/// An opaque resource handle, identified only by its category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceValue {
    pub category: String,
}

impl ResourceValue {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }
}

/// Dynamically-typed value subject to coercion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(ObjectValue),
    Resource(ResourceValue),
}

impl Value {
    /// Extract as boolean if possible
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract as float if possible
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract as string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extract as datetime if possible
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Extract as list if possible
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Extract as associative map if possible
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Extract as object if possible
    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Extract as resource if possible
    pub fn as_resource(&self) -> Option<&ResourceValue> {
        match self {
            Value::Resource(res) => Some(res),
            _ => None,
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if value is a scalar (boolean, integer, float or string)
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Boolean(_) | Value::Integer(_) | Value::Float(_) | Value::String(_)
        )
    }

    /// The class name of an object-like value. `DateTime` values count as
    /// instances of the built-in `DateTime` type; anonymous bags have none.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Value::DateTime(_) => Some("DateTime"),
            Value::Object(obj) => obj.class.as_deref(),
            _ => None,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "DateTime",
            Value::Array(_) => "array",
            Value::Map(_) => "array",
            Value::Object(_) => "object",
            Value::Resource(_) => "resource",
        }
    }

    /// Human-readable description used in diagnostic messages.
    ///
    /// Strings are quoted verbatim, objects are named by their concrete type,
    /// resources by their category, everything else by its classification:
    /// `string "foo"`, `a Bar object`, `an array`, `a stream resource`.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "a null".to_string(),
            Value::Boolean(_) => "a boolean".to_string(),
            Value::Integer(_) => "an integer".to_string(),
            Value::Float(_) => "a float".to_string(),
            Value::String(s) => format!("string \"{}\"", s),
            Value::DateTime(_) => "a DateTime object".to_string(),
            Value::Array(_) | Value::Map(_) => "an array".to_string(),
            Value::Object(obj) => match &obj.class {
                Some(class) => format!("a {} object", class),
                None => "an object".to_string(),
            },
            Value::Resource(res) => format!("a {} resource", res.category),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, item) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, item)?;
                }
                write!(f, "}}")
            }
            Value::Object(obj) => {
                match &obj.class {
                    Some(class) => write!(f, "{}{{", class)?,
                    None => write!(f, "{{")?,
                }
                for (i, (key, item)) in obj.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, item)?;
                }
                write!(f, "}}")
            }
            Value::Resource(res) => write!(f, "resource({})", res.category),
        }
    }
}

/// Convert from Rust primitive types to Value
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(vec: Vec<T>) -> Self {
        Value::Array(vec.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<ObjectValue> for Value {
    fn from(obj: ObjectValue) -> Self {
        Value::Object(obj)
    }
}

impl From<ResourceValue> for Value {
    fn from(res: ResourceValue) -> Self {
        Value::Resource(res)
    }
}

/// Convert an incoming JSON document into a coercible value. JSON objects
/// become associative maps, not data-bag objects.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Integer)
                .or_else(|| n.as_f64().map(Value::Float))
                .unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}
