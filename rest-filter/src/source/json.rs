//! Reading filter sources from JSON request bodies.
//!
//! The body is a flat object using the same keys as the query string:
//!
//! ```json
//! {"id:gt": 2, "tag": ["rust", "sql"], "price:range": [[0, 10], [20, 30]]}
//! ```
//!
//! Keys come out in the JSON library's object order (sorted by key), not in
//! the order the client sent them.

use super::{FilterSource, SourceError};
use crate::Value;
use crate::constants::{MAX_ARRAY_DEPTH, max_filter_keys};
use miniserde::json::{self, Number, Value as JsonValue};

impl FilterSource {
    /// Parse a JSON object string, reading at most [`max_filter_keys`] keys.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidJson`] for malformed JSON,
    /// [`SourceError::ExpectedObject`] for non-objects,
    /// [`SourceError::UnsupportedValue`] for booleans or nested objects and
    /// [`SourceError::TooManyKeys`] past the key limit.
    ///
    /// ```
    /// use rest_filter::{FilterSource, Value};
    ///
    /// let source = FilterSource::from_json(r#"{"id": 2, "deleted_at:null": null}"#).unwrap();
    /// assert_eq!(source.get("id"), Some(&Value::Int(2)));
    /// assert_eq!(source.get("deleted_at:null"), Some(&Value::from("")));
    /// ```
    pub fn from_json(json_str: &str) -> Result<Self, SourceError> {
        Self::from_json_with_limit(json_str, max_filter_keys())
    }

    /// [`from_json`](Self::from_json) with an explicit key limit.
    ///
    /// # Errors
    ///
    /// See [`from_json`](Self::from_json).
    pub fn from_json_with_limit(json_str: &str, max: usize) -> Result<Self, SourceError> {
        let json: JsonValue = json::from_str(json_str).map_err(|_| SourceError::InvalidJson)?;
        Self::read_json(&json, max)
    }

    /// Parse JSON bytes, such as a raw request body.
    ///
    /// # Errors
    ///
    /// Same as [`from_json`](Self::from_json); invalid UTF-8 is `InvalidJson`.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, SourceError> {
        let s = std::str::from_utf8(bytes).map_err(|_| SourceError::InvalidJson)?;
        Self::from_json(s)
    }

    /// Build a source from an already parsed `miniserde` value.
    ///
    /// # Errors
    ///
    /// See [`from_json`](Self::from_json).
    pub fn from_json_value(json: &JsonValue) -> Result<Self, SourceError> {
        Self::read_json(json, max_filter_keys())
    }

    /// Object keys are unique, so the limit is checked once before any value
    /// is converted.
    fn read_json(json: &JsonValue, max: usize) -> Result<Self, SourceError> {
        let JsonValue::Object(obj) = json else {
            return Err(SourceError::ExpectedObject);
        };
        if obj.len() > max {
            return Err(SourceError::TooManyKeys { max });
        }

        let mut source = Self::new();
        for (key, value) in obj.iter() {
            let value = value_from_json(value, 0).map_err(|kind| match kind {
                Rejected::Unsupported => SourceError::UnsupportedValue { key: key.clone() },
                Rejected::TooDeep => SourceError::TooDeep { key: key.clone() },
            })?;
            source.insert(key.clone(), value);
        }
        Ok(source)
    }
}

enum Rejected {
    Unsupported,
    TooDeep,
}

fn value_from_json(json: &JsonValue, depth: usize) -> Result<Value, Rejected> {
    match json {
        JsonValue::Null => Ok(Value::String(String::new())),
        JsonValue::String(s) => Ok(Value::String(s.clone())),
        JsonValue::Number(Number::I64(i)) => Ok(Value::Int(*i)),
        JsonValue::Number(Number::U64(u)) => {
            Ok(i64::try_from(*u).map_or(Value::Float(*u as f64), Value::Int))
        },
        JsonValue::Number(Number::F64(x)) => Ok(Value::Float(*x)),
        JsonValue::Array(items) => {
            if depth >= MAX_ARRAY_DEPTH {
                return Err(Rejected::TooDeep);
            }
            items
                .iter()
                .map(|item| value_from_json(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        },
        JsonValue::Bool(_) | JsonValue::Object(_) => Err(Rejected::Unsupported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        let source = FilterSource::from_json(r#"{"a": "x", "b": 2, "c": 2.5, "d": null}"#).unwrap();
        assert_eq!(source.get("a"), Some(&Value::from("x")));
        assert_eq!(source.get("b"), Some(&Value::Int(2)));
        assert_eq!(source.get("c"), Some(&Value::Float(2.5)));
        assert_eq!(source.get("d"), Some(&Value::from("")));
    }

    #[test]
    fn test_large_unsigned_becomes_float() {
        let source = FilterSource::from_json(r#"{"a": 18446744073709551615}"#).unwrap();
        assert!(matches!(source.get("a"), Some(Value::Float(_))));
    }

    #[test]
    fn test_arrays_and_range_pairs() {
        let source =
            FilterSource::from_json(r#"{"id": [1, 2], "f:range": [[0, 10], [20, 30]]}"#).unwrap();
        assert_eq!(
            source.get("id"),
            Some(&Value::from(vec![Value::Int(1), Value::Int(2)]))
        );
        assert_eq!(
            source.get("f:range"),
            Some(&Value::from(vec![
                Value::from(vec![Value::Int(0), Value::Int(10)]),
                Value::from(vec![Value::Int(20), Value::Int(30)]),
            ]))
        );
    }

    #[test]
    fn test_keys_in_object_order() {
        let source = FilterSource::from_json(r#"{"b": 1, "a": 2}"#).unwrap();
        let keys: Vec<&str> = source.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn test_empty_object() {
        assert!(FilterSource::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert_eq!(
            FilterSource::from_json("{not json"),
            Err(SourceError::InvalidJson)
        );
        assert_eq!(
            FilterSource::from_json_bytes(&[0xff, 0xfe]),
            Err(SourceError::InvalidJson)
        );
    }

    #[test]
    fn test_expected_object() {
        assert_eq!(
            FilterSource::from_json("[1, 2]"),
            Err(SourceError::ExpectedObject)
        );
        assert_eq!(
            FilterSource::from_json(r#""id""#),
            Err(SourceError::ExpectedObject)
        );
    }

    #[test]
    fn test_unsupported_values() {
        assert_eq!(
            FilterSource::from_json(r#"{"active": true}"#),
            Err(SourceError::UnsupportedValue {
                key: "active".into()
            })
        );
        assert_eq!(
            FilterSource::from_json(r#"{"id": {"$eq": 1}}"#),
            Err(SourceError::UnsupportedValue { key: "id".into() })
        );
        assert_eq!(
            FilterSource::from_json(r#"{"id": [1, false]}"#),
            Err(SourceError::UnsupportedValue { key: "id".into() })
        );
    }

    #[test]
    fn test_too_deep() {
        assert_eq!(
            FilterSource::from_json(r#"{"a": [[[[[1]]]]]}"#),
            Err(SourceError::TooDeep { key: "a".into() })
        );
        assert!(FilterSource::from_json(r#"{"a": [[[[1]]]]}"#).is_ok());
    }

    #[test]
    fn test_bytes() {
        let source = FilterSource::from_json_bytes(br#"{"title:like": "big"}"#).unwrap();
        assert_eq!(source.get("title:like"), Some(&Value::from("big")));
    }

    #[test]
    fn test_client_order_is_not_kept() {
        let source = FilterSource::from_json(r#"{"title:like": "big", "id:gt": 2}"#).unwrap();
        let keys: Vec<&str> = source.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["id:gt", "title:like"]);
    }

    #[test]
    fn test_key_limit_rejects_before_converting() {
        // "zz" holds a boolean; the limit fires before any value is looked at
        let body = r#"{"a": 1, "b": 2, "zz": true}"#;
        assert_eq!(
            FilterSource::from_json_with_limit(body, 2),
            Err(SourceError::TooManyKeys { max: 2 })
        );
        assert_eq!(
            FilterSource::from_json_with_limit(body, 3),
            Err(SourceError::UnsupportedValue { key: "zz".into() })
        );
    }

    #[test]
    fn test_default_key_limit() {
        let max = max_filter_keys();
        let fields: Vec<String> = (0..=max).map(|i| format!("\"k{i}\": 1")).collect();
        let body = format!("{{{}}}", fields.join(", "));
        assert_eq!(
            FilterSource::from_json(&body),
            Err(SourceError::TooManyKeys { max })
        );
    }
}
