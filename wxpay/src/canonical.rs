//! Canonical field extraction.
//!
//! Every request type declares its wire fields through [`WireFields`]: an
//! explicit table of `(wire name, value)` entries. Embedded structures (the
//! shared [`Envelope`](crate::Envelope)) are listed as [`FieldValue::Embedded`]
//! and flatten into the same namespace as the outer fields.
//!
//! [`FieldMap::extract`] walks such a declaration and produces the sorted
//! name → string map that both the signer and the XML encoder consume.
//! Only text, integer and timestamp values are representable, so nothing
//! else can leak into a signature base string.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalError;
use crate::timestamp::WireTimestamp;

/// Wire name of the signature field.
pub const SIGN_FIELD: &str = "sign";

/// A single declared field value.
#[derive(Clone, Copy)]
pub enum FieldValue<'a> {
    /// Text, used verbatim.
    Text(&'a str),
    /// Integer, rendered in base 10 without grouping.
    Int(i64),
    /// Timestamp, rendered as `YYYY-MM-DD HH:MM:SS`.
    Timestamp(WireTimestamp),
    /// A nested declaration whose fields flatten into the parent.
    Embedded(&'a dyn WireFields),
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::Timestamp(t) => f.debug_tuple("Timestamp").field(t).finish(),
            Self::Embedded(_) => f.write_str("Embedded(..)"),
        }
    }
}

/// One entry of a [`WireFields`] declaration.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    /// Wire name. Empty for embedded entries.
    pub name: &'static str,
    /// Declared value.
    pub value: FieldValue<'a>,
}

impl<'a> Field<'a> {
    /// A text field.
    #[must_use]
    pub const fn text(name: &'static str, value: &'a str) -> Self {
        Self {
            name,
            value: FieldValue::Text(value),
        }
    }

    /// A text field that is only declared when set.
    #[must_use]
    pub fn text_opt(name: &'static str, value: Option<&'a str>) -> Option<Self> {
        value.map(|v| Self::text(name, v))
    }

    /// An integer field.
    #[must_use]
    pub const fn int(name: &'static str, value: i64) -> Self {
        Self {
            name,
            value: FieldValue::Int(value),
        }
    }

    /// A timestamp field.
    #[must_use]
    pub const fn timestamp(name: &'static str, value: WireTimestamp) -> Self {
        Self {
            name,
            value: FieldValue::Timestamp(value),
        }
    }

    /// An embedded structure, flattened into the parent.
    #[must_use]
    pub const fn embed(value: &'a dyn WireFields) -> Self {
        Self {
            name: "",
            value: FieldValue::Embedded(value),
        }
    }
}

/// Explicit declaration of a type's wire fields.
///
/// Implementations list every field that goes on the wire, in document
/// order. Optional fields that are unset are simply left out.
pub trait WireFields {
    /// Returns the declared fields.
    fn wire_fields(&self) -> Vec<Field<'_>>;
}

/// Which fields an extraction keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Base-string input: drops unnamed fields and [`SIGN_FIELD`].
    Signing,
    /// Every declared scalar field.
    Full,
}

impl Variant {
    fn admits(self, name: &str) -> bool {
        match self {
            Self::Signing => !name.is_empty() && name != SIGN_FIELD,
            Self::Full => true,
        }
    }
}

/// Field name → string value, iterated in byte-wise name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap(BTreeMap<String, String>);

impl FieldMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Extracts the fields declared by `value`, flattening embedded entries.
    #[must_use]
    pub fn extract(value: &dyn WireFields, variant: Variant) -> Self {
        let mut map = Self::new();
        map.walk(value, variant);
        map
    }

    /// Builds a full-variant map from any serializable record.
    ///
    /// Nested objects flatten into the same map. Strings and integers are
    /// kept; arrays, booleans, floats and nulls are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalError::InvalidInputKind`] if `value` does not
    /// serialize to a record, or [`CanonicalError::Serialize`] if it cannot
    /// be serialized at all.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, CanonicalError> {
        match serde_json::to_value(value)? {
            Value::Object(object) => {
                let mut map = Self::new();
                map.flatten_object(object);
                Ok(map)
            }
            other => Err(CanonicalError::InvalidInputKind {
                found: kind_name(&other),
            }),
        }
    }

    /// Inserts a field, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    /// Removes a field, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns `true` if the field is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates fields in byte-wise name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn walk(&mut self, value: &dyn WireFields, variant: Variant) {
        for field in value.wire_fields() {
            if let FieldValue::Embedded(inner) = field.value {
                self.walk(inner, variant);
                continue;
            }
            if !variant.admits(field.name) {
                continue;
            }
            let rendered = match field.value {
                FieldValue::Text(s) => s.to_owned(),
                FieldValue::Int(n) => n.to_string(),
                FieldValue::Timestamp(t) => t.to_string(),
                FieldValue::Embedded(_) => continue,
            };
            self.0.insert(field.name.to_owned(), rendered);
        }
    }

    fn flatten_object(&mut self, object: serde_json::Map<String, Value>) {
        for (name, value) in object {
            match value {
                Value::String(s) => {
                    self.0.insert(name, s);
                }
                Value::Number(n) if n.is_i64() || n.is_u64() => {
                    self.0.insert(name, n.to_string());
                }
                Value::Object(inner) => self.flatten_object(inner),
                _ => {}
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct Inner {
        sign: String,
        nonce: String,
    }

    impl WireFields for Inner {
        fn wire_fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::text("sign", &self.sign),
                Field::text("nonce_str", &self.nonce),
            ]
        }
    }

    struct Outer {
        inner: Inner,
        name: String,
        count: i64,
        at: WireTimestamp,
        note: Option<String>,
    }

    impl WireFields for Outer {
        fn wire_fields(&self) -> Vec<Field<'_>> {
            let mut fields = vec![
                Field::embed(&self.inner),
                Field::text("name", &self.name),
                Field::int("count", self.count),
                Field::timestamp("at", self.at),
                Field::text("", "untagged"),
            ];
            fields.extend(Field::text_opt("note", self.note.as_deref()));
            fields
        }
    }

    fn outer() -> Outer {
        let at = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap();
        Outer {
            inner: Inner {
                sign: "PREVIOUS".into(),
                nonce: "abc".into(),
            },
            name: "alice".into(),
            count: 1_000_000,
            at: at.into(),
            note: None,
        }
    }

    #[test]
    fn test_signing_variant_flattens_and_excludes_sign() {
        let map = FieldMap::extract(&outer(), Variant::Signing);
        let names: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["at", "count", "name", "nonce_str"]);
        assert!(!map.contains(SIGN_FIELD));
    }

    #[test]
    fn test_full_variant_keeps_sign() {
        let map = FieldMap::extract(&outer(), Variant::Full);
        assert_eq!(map.get("sign"), Some("PREVIOUS"));
        assert_eq!(map.get(""), Some("untagged"));
    }

    #[test]
    fn test_scalar_rendering() {
        let map = FieldMap::extract(&outer(), Variant::Signing);
        assert_eq!(map.get("count"), Some("1000000"));
        assert_eq!(map.get("at"), Some("2024-01-02 03:04:05"));
    }

    #[test]
    fn test_unset_optional_is_absent() {
        let mut value = outer();
        assert!(!FieldMap::extract(&value, Variant::Full).contains("note"));
        value.note = Some("hi".into());
        assert_eq!(
            FieldMap::extract(&value, Variant::Full).get("note"),
            Some("hi")
        );
    }

    #[test]
    fn test_iteration_is_bytewise_sorted() {
        let map: FieldMap = [("b", "2"), ("B", "1"), ("a", "3"), ("_x", "4")]
            .into_iter()
            .collect();
        let names: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["B", "_x", "a", "b"]);
    }

    #[test]
    fn test_from_serialize_flattens_scalars() {
        let value = serde_json::json!({
            "appid": "wx1",
            "total_fee": 100,
            "nested": { "nonce_str": "n" },
            "tags": ["a", "b"],
            "flag": true,
            "ratio": 0.5,
            "missing": null,
        });
        let map = FieldMap::from_serialize(&value).unwrap();
        let names: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["appid", "nonce_str", "total_fee"]);
        assert_eq!(map.get("total_fee"), Some("100"));
    }

    #[test]
    fn test_from_serialize_rejects_non_records() {
        let err = FieldMap::from_serialize(&vec![1, 2]).unwrap_err();
        assert!(matches!(
            err,
            CanonicalError::InvalidInputKind { found: "array" }
        ));
        let err = FieldMap::from_serialize("text").unwrap_err();
        assert!(matches!(
            err,
            CanonicalError::InvalidInputKind { found: "string" }
        ));
    }
}
