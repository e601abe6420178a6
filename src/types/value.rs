use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};

/// A field value inside a [`Record`].
///
/// `Null` doubles as the reading for a missing member, so evaluation never
/// has to distinguish "absent" from "present but null".
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    DateTime(DateTime<Utc>),
    List(Vec<FieldValue>),
    Nested(Record),
}

impl FieldValue {
    /// Ordering between two values, crossing `Int`/`Float` freely.
    /// Returns `None` for incomparable kinds (including `Null`, lists and
    /// nested records), which callers treat as a failed comparison.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn partial_cmp_value(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Int(a), FieldValue::Int(b)) => a.partial_cmp(b),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.partial_cmp(b),
            (FieldValue::Int(a), FieldValue::Float(b)) => (*a as f64).partial_cmp(b),
            (FieldValue::Float(a), FieldValue::Int(b)) => a.partial_cmp(&(*b as f64)),
            // Bools only support equality; an ordering is still returned so
            // equal/not_equal work through the same path.
            (FieldValue::Bool(a), FieldValue::Bool(b)) => Some(a.cmp(b)),
            (FieldValue::String(a), FieldValue::String(b)) => a.partial_cmp(b),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => a.partial_cmp(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::String(v) => write!(f, "\"{v}\""),
            FieldValue::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            FieldValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            FieldValue::Nested(rec) => write!(f, "{rec}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::DateTime(v)
    }
}

impl From<Record> for FieldValue {
    fn from(v: Record) -> Self {
        FieldValue::Nested(v)
    }
}

impl<V: Into<FieldValue>> From<Vec<V>> for FieldValue {
    fn from(v: Vec<V>) -> Self {
        FieldValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<FieldValue>> From<Option<V>> for FieldValue {
    fn from(v: Option<V>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Int)
                .or_else(|| n.as_f64().map(FieldValue::Float))
                .unwrap_or(FieldValue::Null),
            serde_json::Value::String(s) => FieldValue::String(s),
            serde_json::Value::Array(items) => {
                FieldValue::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => FieldValue::Nested(map.into()),
        }
    }
}

/// A dynamic record: a map of member names to [`FieldValue`]s.
///
/// Supports dotted-path construction like `"user.profile.age"`; intermediate
/// nested records are created as needed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value at a dot-separated path, consuming and returning the
    /// record for chaining.
    #[must_use]
    pub fn set(mut self, path: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(path, value.into());
        self
    }

    /// Set a single direct member verbatim, without dotted-path splitting.
    /// Needed when a member name itself contains a dot (dynamic field bags).
    #[must_use]
    pub fn set_member(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_owned(), value.into());
        self
    }

    /// Insert a value at a dot-separated path (mutable reference version).
    pub fn insert(&mut self, path: &str, value: FieldValue) {
        match path.split_once('.') {
            None => {
                self.fields.insert(path.to_owned(), value);
            }
            Some((first, rest)) => {
                let entry = self
                    .fields
                    .entry(first.to_owned())
                    .or_insert_with(|| FieldValue::Nested(Record::new()));
                if let FieldValue::Nested(nested) = entry {
                    nested.insert(rest, value);
                } else {
                    let mut nested = Record::new();
                    nested.insert(rest, value);
                    *entry = FieldValue::Nested(nested);
                }
            }
        }
    }

    /// Look up a single direct member. Missing members read as `None`;
    /// evaluation treats that the same as [`FieldValue::Null`].
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Look up a value by dot-separated path, descending through nested
    /// records.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        match path.split_once('.') {
            None => self.fields.get(path),
            Some((first, rest)) => match self.fields.get(first)? {
                FieldValue::Nested(nested) => nested.get(rest),
                _ => None,
            },
        }
    }

    /// Number of direct members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record({} fields)", self.fields.len())
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            fields: map.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}
