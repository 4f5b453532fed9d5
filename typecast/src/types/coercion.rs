// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-type leaf coercions
//!
//! Converts a value to one concrete, non-ambiguous type. The guessing engine
//! hands over here only after the candidate set has been narrowed to a single
//! type; unions never reach this module.

use crate::registry::TypeRegistry;
use crate::types::classify::{boolean_string, is_numeric_str, parse_date_like};
use crate::types::{CastError, CastResult, TypeToken};
use crate::value::{ObjectValue, Value};
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Coercion engine for single concrete target types
#[derive(Debug, Clone)]
pub struct Coercer {
    registry: Arc<TypeRegistry>,
}

impl Coercer {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    /// Coerce a value to the target type. A null value always coerces to
    /// null, whatever the target.
    pub fn coerce(&self, value: &Value, target: &TypeToken) -> CastResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match target {
            TypeToken::Mixed => Ok(value.clone()),
            TypeToken::Null => Ok(Value::Null),
            TypeToken::String => self.to_string_value(value),
            TypeToken::Boolean => self.to_boolean(value),
            TypeToken::Integer => self.to_integer(value),
            TypeToken::Float => self.to_float(value),
            TypeToken::Array => self.to_array(value, None),
            TypeToken::ArrayOf(subtype) => self.to_array(value, Some(subtype)),
            TypeToken::Object => self.to_object(value),
            TypeToken::Resource => self.to_resource(value),
            TypeToken::Named(name) => self.to_class(value, name),
        }
    }

    fn fail(&self, value: &Value, target: &TypeToken, explain: Option<&str>) -> CastError {
        CastError::NotCastable {
            value: value.describe(),
            target: target.describe(),
            explain: explain.map(str::to_string),
        }
    }

    fn to_string_value(&self, value: &Value) -> CastResult<Value> {
        match value {
            Value::String(_) => Ok(value.clone()),
            Value::Boolean(b) => Ok(Value::String(b.to_string())),
            Value::Integer(n) => Ok(Value::String(n.to_string())),
            Value::Float(n) => Ok(Value::String(n.to_string())),
            Value::DateTime(dt) => Ok(Value::String(dt.to_rfc3339())),
            Value::Object(obj) => {
                let stringable = obj
                    .class
                    .as_deref()
                    .map_or(false, |class| self.registry.is_stringable(class));
                if stringable {
                    Ok(Value::String(value.to_string()))
                } else {
                    Err(self.fail(value, &TypeToken::String, None))
                }
            }
            _ => Err(self.fail(value, &TypeToken::String, None)),
        }
    }

    fn to_boolean(&self, value: &Value) -> CastResult<Value> {
        match value {
            Value::Boolean(_) => Ok(value.clone()),
            Value::Integer(n) => Ok(Value::Boolean(*n != 0)),
            Value::Float(n) => Ok(Value::Boolean(*n != 0.0)),
            Value::String(s) => match boolean_string(s) {
                Some(b) => Ok(Value::Boolean(b)),
                None => Err(self.fail(value, &TypeToken::Boolean, None)),
            },
            _ => Err(self.fail(value, &TypeToken::Boolean, None)),
        }
    }

    fn to_integer(&self, value: &Value) -> CastResult<Value> {
        match value {
            Value::Integer(_) => Ok(value.clone()),
            Value::Float(n) => Ok(Value::Integer(*n as i64)),
            Value::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
            Value::String(s) => {
                let trimmed = s.trim();
                // The empty string counts as zero here, though it is never
                // numeric for classification
                if trimmed.is_empty() {
                    return Ok(Value::Integer(0));
                }
                if !is_numeric_str(trimmed) {
                    return Err(self.fail(value, &TypeToken::Integer, None));
                }
                if let Ok(n) = trimmed.parse::<i64>() {
                    return Ok(Value::Integer(n));
                }
                trimmed
                    .parse::<f64>()
                    .map(|n| Value::Integer(n as i64))
                    .map_err(|_| self.fail(value, &TypeToken::Integer, None))
            }
            _ => Err(self.fail(value, &TypeToken::Integer, None)),
        }
    }

    fn to_float(&self, value: &Value) -> CastResult<Value> {
        match value {
            Value::Float(_) => Ok(value.clone()),
            Value::Integer(n) => Ok(Value::Float(*n as f64)),
            Value::Boolean(b) => Ok(Value::Float(f64::from(u8::from(*b)))),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(Value::Float(0.0));
                }
                if !is_numeric_str(trimmed) {
                    return Err(self.fail(value, &TypeToken::Float, None));
                }
                trimmed
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| self.fail(value, &TypeToken::Float, None))
            }
            _ => Err(self.fail(value, &TypeToken::Float, None)),
        }
    }

    fn to_array(&self, value: &Value, subtype: Option<&TypeToken>) -> CastResult<Value> {
        let target = || match subtype {
            Some(sub) => TypeToken::ArrayOf(Box::new(sub.clone())),
            None => TypeToken::Array,
        };

        let plain = match value {
            Value::Resource(_) => return Err(self.fail(value, &target(), None)),
            Value::Array(items) => Value::Array(items.clone()),
            Value::Map(map) => Value::Map(map.clone()),
            // Data bags flatten to their fields, other objects wrap
            Value::Object(obj) if obj.is_bag() => Value::Map(obj.fields.clone()),
            Value::String(s) if s.is_empty() => Value::Array(Vec::new()),
            other => Value::Array(vec![other.clone()]),
        };

        let subtype = match subtype {
            Some(sub) => sub,
            None => return Ok(plain),
        };

        match plain {
            Value::Array(items) => {
                let coerced: CastResult<Vec<Value>> = items
                    .iter()
                    .map(|item| self.coerce(item, subtype))
                    .collect();
                Ok(Value::Array(coerced?))
            }
            Value::Map(map) => {
                let coerced: CastResult<BTreeMap<String, Value>> = map
                    .iter()
                    .map(|(key, item)| Ok((key.clone(), self.coerce(item, subtype)?)))
                    .collect();
                Ok(Value::Map(coerced?))
            }
            other => Ok(other),
        }
    }

    fn to_object(&self, value: &Value) -> CastResult<Value> {
        match value {
            Value::Object(_) | Value::DateTime(_) => Ok(value.clone()),
            Value::Map(map) => Ok(Value::Object(ObjectValue::bag(map.clone()))),
            Value::Array(items) => {
                let fields = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (i.to_string(), item.clone()))
                    .collect();
                Ok(Value::Object(ObjectValue::bag(fields)))
            }
            _ => Err(self.fail(value, &TypeToken::Object, None)),
        }
    }

    fn to_resource(&self, value: &Value) -> CastResult<Value> {
        match value {
            Value::Resource(_) => Ok(value.clone()),
            _ => Err(self.fail(value, &TypeToken::Resource, None)),
        }
    }

    fn to_class(&self, value: &Value, name: &str) -> CastResult<Value> {
        let target = TypeToken::Named(name.to_string());

        if self.registry.is_instance(value, name) {
            return Ok(value.clone());
        }

        if !self.registry.is_registered(name) {
            return Err(self.fail(value, &target, Some("Class doesn't exist")));
        }

        if self.registry.is_date_like(name) {
            return self.to_datetime(value, &target);
        }

        if self.registry.has_from_state(name) {
            let fields = match value {
                Value::Map(map) => Some(map.clone()),
                Value::Object(obj) if obj.is_bag() => Some(obj.fields.clone()),
                _ => None,
            };
            if let Some(fields) = fields {
                return Ok(Value::Object(ObjectValue::instance(name, fields)));
            }
        }

        Err(self.fail(
            value,
            &target,
            Some("class does not support construction from this value"),
        ))
    }

    fn to_datetime(&self, value: &Value, target: &TypeToken) -> CastResult<Value> {
        match value {
            Value::String(s) => parse_date_like(s)
                .map(Value::DateTime)
                .ok_or_else(|| self.fail(value, target, Some("not a valid date"))),
            // UNIX timestamps are accepted for leaf coercion even though the
            // guesser never treats integers as dates
            Value::Integer(ts) => match Utc.timestamp_opt(*ts, 0) {
                chrono::LocalResult::Single(dt) => Ok(Value::DateTime(dt)),
                _ => Err(self.fail(value, target, Some("timestamp out of range"))),
            },
            Value::Float(ts) => {
                let secs = ts.trunc() as i64;
                let nanos = (ts.fract() * 1e9) as u32;
                match Utc.timestamp_opt(secs, nanos) {
                    chrono::LocalResult::Single(dt) => Ok(Value::DateTime(dt)),
                    _ => Err(self.fail(value, target, Some("timestamp out of range"))),
                }
            }
            _ => Err(self.fail(value, target, None)),
        }
    }
}
