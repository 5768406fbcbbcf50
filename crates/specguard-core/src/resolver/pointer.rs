//! RFC 6901 JSON pointer helpers
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use crate::document::PathSegment;
use serde_json::Value;
use thiserror::Error;

/// Reasons a pointer cannot be evaluated against a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("pointer '{pointer}' must be empty or start with '/'")]
    Syntax { pointer: String },

    #[error("invalid escape sequence in token '{token}'")]
    Escape { token: String },

    #[error("property '{token}' not found")]
    MissingKey { token: String },

    #[error("array index {index} out of bounds")]
    IndexOutOfBounds { index: usize },

    #[error("invalid array index '{token}'")]
    InvalidIndex { token: String },

    #[error("cannot descend into a scalar with token '{token}'")]
    NotAContainer { token: String },
}

/// Escape a single reference token (`~` → `~0`, `/` → `~1`)
pub fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Unescape a single reference token; a `~` not followed by `0` or `1` is invalid
pub fn unescape(token: &str) -> Result<String, PointerError> {
    let mut decoded = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            decoded.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => decoded.push('~'),
            Some('1') => decoded.push('/'),
            _ => {
                return Err(PointerError::Escape {
                    token: token.to_string(),
                })
            }
        }
    }
    Ok(decoded)
}

/// Split a pointer into unescaped reference tokens
pub fn parse(pointer: &str) -> Result<Vec<String>, PointerError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(PointerError::Syntax {
            pointer: pointer.to_string(),
        });
    };
    rest.split('/').map(unescape).collect()
}

/// Evaluate a pointer against a document tree
pub fn walk<'v>(document: &'v Value, pointer: &str) -> Result<&'v Value, PointerError> {
    let mut current = document;
    for token in parse(pointer)? {
        current = match current {
            Value::Object(map) => map
                .get(&token)
                .ok_or(PointerError::MissingKey { token })?,
            Value::Array(items) => {
                let index = array_index(&token)?;
                items
                    .get(index)
                    .ok_or(PointerError::IndexOutOfBounds { index })?
            }
            _ => return Err(PointerError::NotAContainer { token }),
        };
    }
    Ok(current)
}

/// Array indices are decimal without leading zeros; `-` never names an element
fn array_index(token: &str) -> Result<usize, PointerError> {
    let well_formed = !token.is_empty()
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token == "0" || !token.starts_with('0'));
    if !well_formed {
        return Err(PointerError::InvalidIndex {
            token: token.to_string(),
        });
    }
    token.parse().map_err(|_| PointerError::InvalidIndex {
        token: token.to_string(),
    })
}

/// Append one segment to an existing pointer
pub fn join(pointer: &str, segment: &PathSegment) -> String {
    match segment {
        PathSegment::Key(key) => format!("{}/{}", pointer, escape(key)),
        PathSegment::Index(index) => format!("{}/{}", pointer, index),
    }
}

/// Render a location path as a pointer
pub fn from_path(path: &[PathSegment]) -> String {
    path.iter().fold(String::new(), |pointer, segment| join(&pointer, segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape_round_trip() {
        assert_eq!(escape("/pets/{id}"), "~1pets~1{id}");
        assert_eq!(escape("a~b"), "a~0b");
        assert_eq!(unescape("~01").unwrap(), "~1");
        assert_eq!(unescape("~1pets~1{id}").unwrap(), "/pets/{id}");
    }

    #[test]
    fn test_invalid_escape() {
        assert!(matches!(unescape("a~2"), Err(PointerError::Escape { .. })));
        assert!(matches!(unescape("a~"), Err(PointerError::Escape { .. })));
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse("").unwrap(), Vec::<String>::new());
        assert_eq!(parse("/").unwrap(), vec![String::new()]);
        assert_eq!(
            parse("/components/schemas/Pet").unwrap(),
            vec!["components", "schemas", "Pet"]
        );
        assert!(matches!(parse("components"), Err(PointerError::Syntax { .. })));
    }

    #[test]
    fn test_walk() {
        let document = json!({
            "paths": {"/pets": {"get": {"parameters": [{"name": "limit"}]}}},
            "": {"empty": true}
        });

        assert_eq!(walk(&document, "").unwrap(), &document);
        assert_eq!(
            walk(&document, "/paths/~1pets/get/parameters/0/name").unwrap(),
            &json!("limit")
        );
        assert_eq!(walk(&document, "/").unwrap(), &json!({"empty": true}));
    }

    #[test]
    fn test_walk_failures() {
        let document = json!({"items": [1, 2], "name": "x"});

        assert_eq!(
            walk(&document, "/missing"),
            Err(PointerError::MissingKey {
                token: "missing".to_string()
            })
        );
        assert_eq!(
            walk(&document, "/items/5"),
            Err(PointerError::IndexOutOfBounds { index: 5 })
        );
        assert!(matches!(
            walk(&document, "/items/01"),
            Err(PointerError::InvalidIndex { .. })
        ));
        assert!(matches!(
            walk(&document, "/items/-"),
            Err(PointerError::InvalidIndex { .. })
        ));
        assert!(matches!(
            walk(&document, "/name/first"),
            Err(PointerError::NotAContainer { .. })
        ));
    }

    #[test]
    fn test_from_path() {
        let path = vec![
            PathSegment::from("paths"),
            PathSegment::from("/pets"),
            PathSegment::from("parameters"),
            PathSegment::from(0),
        ];
        assert_eq!(from_path(&path), "/paths/~1pets/parameters/0");
        assert_eq!(from_path(&[]), "");
    }
}
