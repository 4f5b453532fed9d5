//! Union Type Guessing Tests
//!
//! End-to-end tests for resolving a union of candidate types against a
//! runtime value, covering scalars, lists, dates and registered classes.

use std::collections::BTreeMap;
use std::sync::Arc;
use typecast::{Guess, ObjectValue, TypeGuess, TypeInfo, TypeRegistry, TypeToken, Value};

fn registry() -> Arc<TypeRegistry> {
    let mut reg = TypeRegistry::new();
    reg.register("Foo", TypeInfo::default());
    reg.register(
        "Bag",
        TypeInfo {
            traversable: true,
            ..Default::default()
        },
    );
    reg.register("Base", TypeInfo::default());
    reg.register(
        "Derived",
        TypeInfo {
            parents: vec!["Base".to_string()],
            ..Default::default()
        },
    );
    Arc::new(reg)
}

fn tokens(expr: &str) -> Vec<TypeToken> {
    expr.split('|').map(TypeToken::parse).collect()
}

/// Resolve and render the winning type, checking union order does not matter
fn guess_of(value: &Value, expr: &str) -> Option<String> {
    let guesser = TypeGuess::new(registry());
    let forward = tokens(expr);
    let mut reversed = forward.clone();
    reversed.reverse();

    let result = guesser.resolve(value, &forward).map(|g| g.to_string());
    let flipped = guesser.resolve(value, &reversed).map(|g| g.to_string());
    assert_eq!(result, flipped, "order dependence for {:?} vs {}", value, expr);

    result
}

fn list(items: Vec<Value>) -> Value {
    Value::Array(items)
}

#[test]
fn test_single_candidate_is_trusted() {
    // No validation happens with one candidate, even an absurd one
    assert_eq!(
        guess_of(&list(vec![Value::Integer(1)]), "integer"),
        Some("integer".to_string())
    );
    assert_eq!(
        guess_of(&Value::from("foo"), "DateTime"),
        Some("DateTime".to_string())
    );
}

#[test]
fn test_null_tokens_mark_optionality() {
    assert_eq!(
        guess_of(&Value::from("10"), "integer|null"),
        Some("integer".to_string())
    );
    assert_eq!(guess_of(&Value::from("10"), "null"), None);
}

#[test]
fn test_numeric_precedence() {
    assert_eq!(
        guess_of(&Value::Float(10.0), "integer|float"),
        Some("float".to_string())
    );
    assert_eq!(
        guess_of(&Value::from("10"), "integer|float"),
        Some("integer".to_string())
    );
    assert_eq!(
        guess_of(&Value::from("10.5"), "integer|float"),
        Some("float".to_string())
    );
    assert_eq!(
        guess_of(&Value::from("10"), "string|integer|float"),
        Some("integer".to_string())
    );
    assert_eq!(
        guess_of(&Value::from("10.0"), "string|integer|float"),
        Some("float".to_string())
    );
    assert_eq!(
        guess_of(&Value::from("foo"), "string|integer|float"),
        Some("string".to_string())
    );
}

#[test]
fn test_native_boolean_wins() {
    assert_eq!(
        guess_of(&Value::Boolean(true), "integer|boolean"),
        Some("boolean".to_string())
    );
    assert_eq!(
        guess_of(&Value::Integer(1), "integer|boolean"),
        Some("integer".to_string())
    );
    assert_eq!(
        guess_of(&Value::from("10.0"), "integer|boolean"),
        Some("integer".to_string())
    );
}

#[test]
fn test_boolean_like_strings() {
    // A real string candidate takes the value as-is
    assert_eq!(
        guess_of(&Value::from("on"), "string|boolean"),
        Some("string".to_string())
    );
    // Without one, the boolean reading is the only viable candidate
    assert_eq!(
        guess_of(&Value::from("on"), "integer|boolean"),
        Some("boolean".to_string())
    );

    // "1" is numeric AND boolean-like at once; the numeric reading wins
    // for string values
    assert_eq!(
        guess_of(&Value::from("1"), "integer|boolean"),
        Some("integer".to_string())
    );
    assert_eq!(
        guess_of(&Value::from("1"), "string|integer|boolean"),
        Some("integer".to_string())
    );
}

#[test]
fn test_date_strings() {
    assert_eq!(
        guess_of(&Value::from("2018-01-03"), "integer|DateTime|string"),
        Some("DateTime".to_string())
    );
    assert_eq!(
        guess_of(&Value::from("2018-01-03"), "integer|string"),
        Some("string".to_string())
    );
}

#[test]
fn test_structural_filter() {
    assert_eq!(
        guess_of(&Value::from("10"), "integer|array|object"),
        Some("integer".to_string())
    );
    assert_eq!(
        guess_of(&list(vec![Value::Integer(10), Value::Integer(20)]), "integer|integer[]"),
        Some("integer[]".to_string())
    );
    assert_eq!(
        guess_of(&list(vec![Value::Integer(10), Value::Integer(20)]), "object|integer[]"),
        Some("integer[]".to_string())
    );
    assert_eq!(
        guess_of(&list(vec![Value::Integer(10), Value::Integer(20)]), "Foo|integer[]"),
        Some("integer[]".to_string())
    );
}

#[test]
fn test_element_type_reduction() {
    let ints = list(vec![Value::Integer(10), Value::Integer(20)]);
    assert_eq!(
        guess_of(&ints, "string[]|integer[]"),
        Some("integer[]".to_string())
    );
    assert_eq!(
        guess_of(&ints, "DateTime[]|integer[]"),
        Some("integer[]".to_string())
    );

    let mixed = list(vec![Value::from("2018-01-03"), Value::Integer(1525027635)]);
    assert_eq!(
        guess_of(&mixed, "DateTime[]|integer[]"),
        Some("DateTime[]".to_string())
    );

    let strings = list(vec![Value::from("2018-01-03"), Value::from("hello")]);
    assert_eq!(
        guess_of(&strings, "DateTime[]|string[]"),
        Some("string[]".to_string())
    );
}

#[test]
fn test_scalar_against_typed_arrays_wraps() {
    // The scalar rules pick the element type, then the winner is re-wrapped
    assert_eq!(
        guess_of(&Value::Integer(10), "string[]|integer[]"),
        Some("integer[]".to_string())
    );
    assert_eq!(
        guess_of(&Value::from("10.5"), "integer[]|float[]"),
        Some("float[]".to_string())
    );
}

#[test]
fn test_named_type_specificity() {
    let derived = Value::Object(ObjectValue::instance("Derived", BTreeMap::new()));
    assert_eq!(
        guess_of(&derived, "Base|Derived"),
        Some("Derived".to_string())
    );
    // The parent alone still matches through the hierarchy
    assert_eq!(guess_of(&derived, "Base|integer"), Some("Base".to_string()));
}

#[test]
fn test_traversable_composite() {
    let bag = Value::Object(ObjectValue::bag(BTreeMap::new()));
    let guesser = TypeGuess::new(registry());

    let guess = guesser.resolve(&bag, &tokens("Foo|Bag")).unwrap();
    match guess {
        Guess::ScalarOrArray { plain, element } => {
            assert_eq!(plain.to_string(), "Foo");
            assert_eq!(element.to_string(), "Bag");
        }
        other => panic!("expected composite, got {}", other),
    }

    // Same outcome with the union flipped
    let flipped = guesser.resolve(&bag, &tokens("Bag|Foo")).unwrap();
    assert_eq!(flipped.to_string(), "Foo|Bag[]");
}

#[test]
fn test_ambiguity_yields_none() {
    assert_eq!(guess_of(&Value::from("hello"), "integer[]|boolean[]|object"), None);
    // Two unrelated classes the value is an instance of neither
    assert_eq!(guess_of(&Value::Integer(5), "Base|Foo"), None);
}
