//! Numeric comparison and JSON equality
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Relative tolerance for `multipleOf` on non-integral operands
pub const MULTIPLE_OF_TOLERANCE: f64 = 1e-9;

/// Compare two JSON numbers, exactly when both are integers
pub fn compare(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    // Mixed signs between i64 and u64 ranges
    if let (Some(x), Some(_)) = (a.as_i64(), b.as_u64()) {
        if x < 0 {
            return Some(Ordering::Less);
        }
    }
    if let (Some(_), Some(y)) = (a.as_u64(), b.as_i64()) {
        if y < 0 {
            return Some(Ordering::Greater);
        }
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

/// An integer value within `i128`, either from an integer literal or an
/// integral float
pub fn as_integer(number: &Number) -> Option<i128> {
    if let Some(i) = number.as_i64() {
        return Some(i128::from(i));
    }
    if let Some(u) = number.as_u64() {
        return Some(i128::from(u));
    }
    let f = number.as_f64()?;
    if is_integral(f) && f.abs() < i128::MAX as f64 {
        Some(f as i128)
    } else {
        None
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0
}

/// Whether `value` is an integral number, of any magnitude
pub fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(is_integral),
        _ => false,
    }
}

/// `multipleOf`: exact remainder for integer literals, tolerance otherwise
pub fn is_multiple_of(value: &Number, divisor: &Number) -> bool {
    let integral = |n: &Number| n.is_i64() || n.is_u64();
    if integral(value) && integral(divisor) {
        if let (Some(v), Some(d)) = (as_integer(value), as_integer(divisor)) {
            return d != 0 && v % d == 0;
        }
    }

    let (Some(v), Some(d)) = (value.as_f64(), divisor.as_f64()) else {
        return false;
    };
    if d == 0.0 {
        return false;
    }
    let quotient = v / d;
    if !quotient.is_finite() {
        return false;
    }
    (quotient - quotient.round()).abs() <= MULTIPLE_OF_TOLERANCE * quotient.abs().max(1.0)
}

/// JSON equality where numbers compare by value (`1` equals `1.0`)
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare(x, y) == Some(Ordering::Equal),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| json_equal(x, y)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn n(value: Value) -> Number {
        match value {
            Value::Number(n) => n,
            other => panic!("not a number: {other}"),
        }
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare(&n(json!(1)), &n(json!(2))), Some(Ordering::Less));
        assert_eq!(compare(&n(json!(2.5)), &n(json!(2))), Some(Ordering::Greater));
        assert_eq!(compare(&n(json!(-1)), &n(json!(u64::MAX))), Some(Ordering::Less));
        assert_eq!(compare(&n(json!(u64::MAX)), &n(json!(-1))), Some(Ordering::Greater));
        assert_eq!(compare(&n(json!(3)), &n(json!(3.0))), Some(Ordering::Equal));
    }

    #[test]
    fn test_is_integer() {
        assert!(is_integer(&json!(3)));
        assert!(is_integer(&json!(3.0)));
        assert!(!is_integer(&json!(3.5)));
        assert!(!is_integer(&json!("3")));
        assert!(is_integer(&json!(1e20)));
        assert!(is_integer(&json!(-9.0e15)));
        assert!(!is_integer(&json!(1.5e-3)));
    }

    #[test]
    fn test_as_integer_range() {
        assert_eq!(as_integer(&n(json!(1e20))), Some(100_000_000_000_000_000_000));
        assert_eq!(as_integer(&n(json!(4.0))), Some(4));
        assert_eq!(as_integer(&n(json!(1e300))), None);
        assert_eq!(as_integer(&n(json!(2.5))), None);
    }

    #[test]
    fn test_multiple_of_integers_is_exact() {
        assert!(is_multiple_of(&n(json!(10)), &n(json!(5))));
        assert!(!is_multiple_of(&n(json!(10)), &n(json!(3))));
        assert!(is_multiple_of(&n(json!(9007199254740993_i64)), &n(json!(1))));
        assert!(!is_multiple_of(&n(json!(9007199254740993_i64)), &n(json!(2))));
        assert!(!is_multiple_of(&n(json!(5)), &n(json!(0))));
    }

    #[test]
    fn test_multiple_of_floats_tolerates_representation_error() {
        assert!(is_multiple_of(&n(json!(0.3)), &n(json!(0.1))));
        assert!(is_multiple_of(&n(json!(19.99)), &n(json!(0.01))));
        assert!(is_multiple_of(&n(json!(4.0)), &n(json!(2))));
        assert!(!is_multiple_of(&n(json!(0.35)), &n(json!(0.1))));
    }

    #[test]
    fn test_json_equal() {
        assert!(json_equal(&json!([1, {"a": 2.0}]), &json!([1.0, {"a": 2}])));
        assert!(!json_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!json_equal(&json!("1"), &json!(1)));
    }
}
