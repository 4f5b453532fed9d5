// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Typecast - Runtime value-to-type coercion
//!
//! Typecast converts loosely typed runtime values (form input, JSON, config
//! files) to a requested type, including union expressions where the right
//! member has to be inferred from the value itself.
//!
//! # Features
//!
//! - **Union resolution**: `"integer|DateTime[]"` picks the member the value
//!   fits best via candidate elimination
//! - **Leaf coercions**: per-type converters for every primitive, arrays,
//!   objects and registered classes
//! - **Type registry**: declared capabilities (traversable, stringable,
//!   date-like) instead of runtime reflection
//! - **Failure policy**: raise errors or warn-and-keep, per caster
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use typecast::{TypeCast, TypeRegistry, Value};
//!
//! let caster = TypeCast::new(Arc::new(TypeRegistry::new()));
//! let n = caster.cast(&Value::from("10"), "integer|float")?;
//! assert_eq!(n, Value::Integer(10));
//! # Ok::<(), typecast::CastError>(())
//! ```

pub mod registry;
pub mod types;
pub mod value;

// Re-export the public API
pub use registry::{TypeInfo, TypeRegistry};
pub use types::{
    CastError, CastResult, Classification, Classifier, Coercer, FailurePolicy, Guess, TypeCast,
    TypeGuess, TypeToken, ValueKind,
};
pub use value::{ObjectValue, ResourceValue, Value};

/// Typecast version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
