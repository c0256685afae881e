//! Lenient field access on parsed provider documents.
//!
//! Optional fields with an unexpected JSON type are reported as absent, not as
//! an error; the provider modules decide which fields are required.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ParseError, ParseResult};

pub type Object = Map<String, Value>;

/// Parses the raw payload into a generic document.
pub fn parse_document(json: &str) -> ParseResult<Value> {
    Ok(serde_json::from_str(json)?)
}

/// The top level of the document, which every provider sends as an object.
pub fn root_object(doc: &Value) -> ParseResult<&Object> {
    doc.as_object().ok_or(ParseError::MissingAnchor("root object"))
}

fn mistyped(key: &str, value: &Value) {
    debug!(field = key, value = %value, "ignoring field with unexpected type");
}

/// A numeric field. JSON `null` counts as absent.
pub fn number(obj: &Object, key: &str) -> Option<f64> {
    match obj.get(key)? {
        Value::Null => None,
        v => v.as_f64().or_else(|| {
            mistyped(key, v);
            None
        }),
    }
}

/// An integral field. Floats that hold a whole number are accepted.
pub fn integer(obj: &Object, key: &str) -> Option<i64> {
    match obj.get(key)? {
        Value::Null => None,
        v => v
            .as_i64()
            .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .or_else(|| {
                mistyped(key, v);
                None
            }),
    }
}

/// A numeric field rounded to the nearest integer.
pub fn rounded(obj: &Object, key: &str) -> Option<i64> {
    number(obj, key).map(|f| f.round() as i64)
}

/// A rounded numeric field that must fit into an `i16`.
pub fn small_int(obj: &Object, key: &str) -> Option<i16> {
    let value = rounded(obj, key)?;
    i16::try_from(value).ok().or_else(|| {
        debug!(field = key, value, "ignoring out of range value");
        None
    })
}

pub fn string<'a>(obj: &'a Object, key: &str) -> Option<&'a str> {
    match obj.get(key)? {
        Value::Null => None,
        v => v.as_str().or_else(|| {
            mistyped(key, v);
            None
        }),
    }
}

pub fn object<'a>(obj: &'a Object, key: &str) -> Option<&'a Object> {
    obj.get(key).and_then(Value::as_object)
}

pub fn array<'a>(obj: &'a Object, key: &str) -> Option<&'a Vec<Value>> {
    obj.get(key).and_then(Value::as_array)
}

/// A Unix timestamp field in seconds.
pub fn timestamp(obj: &Object, key: &str) -> Option<DateTime<Utc>> {
    integer(obj, key).and_then(unix_to_utc)
}

pub fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

/// Reads an anchor object, failing when it is absent or not an object.
pub fn required_object<'a>(obj: &'a Object, key: &'static str) -> ParseResult<&'a Object> {
    object(obj, key).ok_or(ParseError::MissingAnchor(key))
}

/// Reads an anchor array, failing when it is absent or not an array.
pub fn required_array<'a>(obj: &'a Object, key: &'static str) -> ParseResult<&'a Vec<Value>> {
    array(obj, key).ok_or(ParseError::MissingAnchor(key))
}

/// Checks a provider-declared item count against what was actually parsed.
pub fn check_count(declared: i64, actual: usize) -> ParseResult<()> {
    if usize::try_from(declared).is_ok_and(|d| d == actual) {
        Ok(())
    } else {
        Err(ParseError::InconsistentCount { declared, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Object {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn mistyped_optional_fields_are_absent() {
        let o = obj(json!({"temp": "warm", "humidity": null, "deg": 20.5, "name": 3}));
        assert_eq!(number(&o, "temp"), None);
        assert_eq!(number(&o, "humidity"), None);
        assert_eq!(integer(&o, "deg"), None);
        assert_eq!(string(&o, "name"), None);
        assert_eq!(number(&o, "missing"), None);
    }

    #[test]
    fn integral_floats_are_accepted_as_integers() {
        let o = obj(json!({"dt": 1530307200.0, "pres": 1012.6}));
        assert_eq!(integer(&o, "dt"), Some(1_530_307_200));
        assert_eq!(rounded(&o, "pres"), Some(1013));
        assert_eq!(small_int(&o, "pres"), Some(1013));
    }

    #[test]
    fn small_int_rejects_overflow() {
        let o = obj(json!({"pressure": 100000}));
        assert_eq!(small_int(&o, "pressure"), None);
    }

    #[test]
    fn anchors_must_have_the_right_type() {
        let o = obj(json!({"list": {}, "main": []}));
        assert!(matches!(
            required_array(&o, "list"),
            Err(ParseError::MissingAnchor("list"))
        ));
        assert!(matches!(
            required_object(&o, "main"),
            Err(ParseError::MissingAnchor("main"))
        ));
    }

    #[test]
    fn count_check() {
        assert!(check_count(2, 2).is_ok());
        assert!(matches!(
            check_count(2, 1),
            Err(ParseError::InconsistentCount {
                declared: 2,
                actual: 1
            })
        ));
        assert!(check_count(-1, 0).is_err());
    }

    #[test]
    fn root_must_be_an_object() {
        let doc = parse_document("[1, 2]").unwrap();
        assert!(root_object(&doc).is_err());
        assert!(matches!(
            parse_document("{ this is not json"),
            Err(ParseError::Malformed(_))
        ));
    }
}
