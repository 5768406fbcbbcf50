//! `format` keyword checks
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use crate::keywords::numeric::as_integer;
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde_json::Value;
use url::Url;

/// Base used to check relative references for syntax
const REFERENCE_BASE: &str = "specguard://base/document";

/// Check `instance` against a named format; unknown formats and instances of
/// a type the format does not apply to always pass
pub fn check(format: &str, instance: &Value) -> bool {
    match (format, instance) {
        ("uri", Value::String(s)) => is_uri(s),
        ("uri-reference", Value::String(s)) => is_uri_reference(s),
        ("email", Value::String(s)) => is_email(s),
        ("regex", Value::String(s)) => is_regex(s),
        ("date", Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() && s.len() == 10,
        ("date-time", Value::String(s)) => DateTime::parse_from_rfc3339(s).is_ok(),
        ("int32", Value::Number(n)) => {
            as_integer(n).is_some_and(|i| i >= i128::from(i32::MIN) && i <= i128::from(i32::MAX))
        }
        ("int64", Value::Number(n)) => {
            as_integer(n).is_some_and(|i| i >= i128::from(i64::MIN) && i <= i128::from(i64::MAX))
        }
        _ => true,
    }
}

fn has_forbidden_characters(s: &str) -> bool {
    s.chars().any(|c| c.is_whitespace() || c.is_control())
}

fn is_uri(s: &str) -> bool {
    !has_forbidden_characters(s) && Url::parse(s).is_ok()
}

fn is_uri_reference(s: &str) -> bool {
    if has_forbidden_characters(s) {
        return false;
    }
    if Url::parse(s).is_ok() {
        return true;
    }
    Url::parse(REFERENCE_BASE)
        .and_then(|base| base.join(s))
        .is_ok()
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !local.contains('@')
        && !has_forbidden_characters(s)
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// ECMA-262 constructs the `regex` crate lacks (look-around, backreferences)
/// are accepted as valid patterns
fn is_regex(s: &str) -> bool {
    match Regex::new(s) {
        Ok(_) => true,
        Err(regex::Error::Syntax(message)) => {
            message.contains("look-around") || message.contains("backreferences")
        }
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_uri_formats() {
        assert!(check("uri", &json!("https://example.com/api")));
        assert!(check("uri", &json!("urn:isbn:0451450523")));
        assert!(!check("uri", &json!("/relative/path")));
        assert!(!check("uri", &json!("https://example.com/a b")));

        assert!(check("uri-reference", &json!("#/components/schemas/Pet")));
        assert!(check("uri-reference", &json!("../common.yaml#/Error")));
        assert!(check("uri-reference", &json!("https://example.com/terms")));
        assert!(!check("uri-reference", &json!("#/components/schemas/Pet Name")));
    }

    #[test]
    fn test_email() {
        assert!(check("email", &json!("api@example.com")));
        assert!(!check("email", &json!("example.com")));
        assert!(!check("email", &json!("@example.com")));
        assert!(!check("email", &json!("a@b@example.com")));
    }

    #[test]
    fn test_regex_format() {
        assert!(check("regex", &json!("^[a-z]+$")));
        assert!(check("regex", &json!("^(?!internal).*$")));
        assert!(!check("regex", &json!("^[a-z")));
    }

    #[test]
    fn test_dates() {
        assert!(check("date", &json!("2024-02-29")));
        assert!(!check("date", &json!("2023-02-29")));
        assert!(!check("date", &json!("2024-2-9")));
        assert!(check("date-time", &json!("2024-02-29T10:00:00Z")));
        assert!(check("date-time", &json!("2024-02-29T10:00:00.5+02:00")));
        assert!(!check("date-time", &json!("2024-02-29 10:00")));
    }

    #[test]
    fn test_integer_formats() {
        assert!(check("int32", &json!(2147483647)));
        assert!(!check("int32", &json!(2147483648_i64)));
        assert!(check("int64", &json!(-9223372036854775808_i64)));
        assert!(!check("int64", &json!(18446744073709551615_u64)));
        assert!(!check("int32", &json!(1.5)));
        assert!(check("int64", &json!(9.0e18)));
        assert!(!check("int64", &json!(1e20)));
    }

    #[test]
    fn test_unknown_formats_and_other_types_pass() {
        assert!(check("uuid", &json!("not-a-uuid")));
        assert!(check("uri", &json!(42)));
        assert!(check("int32", &json!("text")));
    }
}
