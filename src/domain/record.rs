//! Record abstraction and field values.
//!
//! A grid instance holds records of one uniform shape. The engine never looks
//! inside a record except through the [`Record`] trait: a stable identity for
//! selection and row keys, a keyed lookup for sorting, and the full list of
//! field values for free-text search.
//!
//! Field values are normalized into [`FieldValue`], whose
//! [`canonical_string`](FieldValue::canonical_string) is the single textual
//! form used by the predicate engine. Numbers and dates get no type-aware
//! matching; `42` matches the query `"4"` because `"42"` contains `"4"`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;

use super::error::{GridError, Result};

/// A row of caller data that the grid can search, sort and select.
///
/// `row_id` must be unique within one collection and stable across
/// collection refreshes: selection is stored by id, never by position.
///
/// # Examples
///
/// ```
/// use virtgrid::domain::{FieldValue, Record};
///
/// struct Bin {
///     id: u32,
///     code: String,
///     capacity: Option<i64>,
/// }
///
/// impl Record for Bin {
///     type Id = u32;
///
///     fn row_id(&self) -> u32 {
///         self.id
///     }
///
///     fn field(&self, key: &str) -> FieldValue {
///         match key {
///             "id" => FieldValue::from(i64::from(self.id)),
///             "code" => FieldValue::from(self.code.as_str()),
///             "capacity" => FieldValue::from(self.capacity),
///             _ => FieldValue::Null,
///         }
///     }
///
///     fn fields(&self) -> Vec<FieldValue> {
///         vec![self.field("id"), self.field("code"), self.field("capacity")]
///     }
/// }
///
/// let bin = Bin { id: 7, code: "A-01".into(), capacity: None };
/// assert!(bin.field("capacity").is_null());
/// ```
pub trait Record {
    /// Identity type. Cloned into the selection store, so keep it cheap.
    type Id: Clone + Eq + Hash + fmt::Debug;

    /// Returns the stable, unique identity of this record.
    fn row_id(&self) -> Self::Id;

    /// Returns the value stored under `key`, or [`FieldValue::Null`] when the
    /// record has no such field.
    fn field(&self, key: &str) -> FieldValue;

    /// Returns every searchable field value of the record.
    fn fields(&self) -> Vec<FieldValue>;
}

/// A single cell value as seen by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Missing or explicitly empty value. Sorts last in both directions.
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    /// Returns `true` for [`FieldValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the canonical textual form used for searching and default display.
    ///
    /// `Null` has no text and yields `None`. Dates render as `%Y-%m-%d`,
    /// date-times as RFC 3339, numbers through their `Display` impl.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use virtgrid::domain::FieldValue;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    /// assert_eq!(FieldValue::Date(date).canonical_string().as_deref(), Some("2024-03-09"));
    /// assert_eq!(FieldValue::Float(2.5).canonical_string().as_deref(), Some("2.5"));
    /// assert!(FieldValue::Null.canonical_string().is_none());
    /// ```
    #[must_use]
    pub fn canonical_string(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Self::Integer(i) => Some(Cow::Owned(i.to_string())),
            Self::Float(f) => Some(Cow::Owned(f.to_string())),
            Self::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Self::Date(d) => Some(Cow::Owned(d.format("%Y-%m-%d").to_string())),
            Self::DateTime(dt) => Some(Cow::Owned(dt.to_rfc3339())),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.canonical_string() {
            Some(text) => f.write_str(&text),
            None => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            Value::String(s) => Self::Text(s.clone()),
            // Nested structures search and sort by their compact JSON text.
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }
}

/// A record backed by a JSON object, identified by one of its fields.
///
/// This is the shape a REST layer typically hands over: an array of objects
/// with an `id`-like key. String and numeric ids are accepted; numeric ids are
/// normalized to their decimal text so `7` and `"7"` name the same row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRecord {
    id: String,
    values: serde_json::Map<String, Value>,
}

impl JsonRecord {
    /// Builds a record from a JSON value, reading the identity from `id_field`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::MissingRowId`] if `value` is not an object, or the
    /// id field is absent or neither a string nor a number.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use virtgrid::domain::{JsonRecord, Record};
    ///
    /// let record = JsonRecord::from_value(json!({"sku": 12, "name": "Pallet"}), "sku", 0)?;
    /// assert_eq!(record.row_id(), "12");
    /// # Ok::<(), virtgrid::GridError>(())
    /// ```
    pub fn from_value(value: Value, id_field: &str, index: usize) -> Result<Self> {
        let missing = || GridError::MissingRowId {
            index,
            field: id_field.to_string(),
        };

        let Value::Object(values) = value else {
            return Err(missing());
        };

        let id = match values.get(id_field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(missing()),
        };

        Ok(Self { id, values })
    }

    /// Returns the raw JSON value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the underlying JSON object.
    #[must_use]
    pub const fn values(&self) -> &serde_json::Map<String, Value> {
        &self.values
    }
}

impl Record for JsonRecord {
    type Id = String;

    fn row_id(&self) -> String {
        self.id.clone()
    }

    fn field(&self, key: &str) -> FieldValue {
        self.values.get(key).map_or(FieldValue::Null, FieldValue::from)
    }

    fn fields(&self) -> Vec<FieldValue> {
        self.values.values().map(FieldValue::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_strings_cover_every_variant() {
        let at = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(FieldValue::Bool(true).canonical_string().unwrap(), "true");
        assert_eq!(FieldValue::Integer(-3).canonical_string().unwrap(), "-3");
        assert_eq!(FieldValue::Float(2.0).canonical_string().unwrap(), "2");
        assert_eq!(FieldValue::from("Dock 4").canonical_string().unwrap(), "Dock 4");
        assert_eq!(
            FieldValue::DateTime(at).canonical_string().unwrap(),
            "2024-01-02T03:04:05+00:00"
        );
        assert_eq!(FieldValue::Null.to_string(), "");
    }

    #[test]
    fn option_conversion_maps_none_to_null() {
        assert!(FieldValue::from(None::<i64>).is_null());
        assert_eq!(FieldValue::from(Some(5_i64)), FieldValue::Integer(5));
    }

    #[test]
    fn json_values_convert_to_field_values() {
        assert_eq!(FieldValue::from(&json!(3)), FieldValue::Integer(3));
        assert_eq!(FieldValue::from(&json!(1.25)), FieldValue::Float(1.25));
        assert_eq!(FieldValue::from(&json!(null)), FieldValue::Null);
        assert_eq!(
            FieldValue::from(&json!(["a", 1])),
            FieldValue::Text("[\"a\",1]".to_string())
        );
    }

    #[test]
    fn json_record_reads_string_and_numeric_ids() {
        let by_number = JsonRecord::from_value(json!({"id": 9, "zone": "B"}), "id", 0).unwrap();
        let by_string = JsonRecord::from_value(json!({"id": "LOC-1"}), "id", 1).unwrap();

        assert_eq!(by_number.row_id(), "9");
        assert_eq!(by_string.row_id(), "LOC-1");
        assert_eq!(by_number.field("zone"), FieldValue::from("B"));
        assert!(by_number.field("missing").is_null());
        assert_eq!(by_number.fields().len(), 2);
    }

    #[test]
    fn json_record_rejects_missing_or_unusable_ids() {
        let err = JsonRecord::from_value(json!({"name": "x"}), "id", 4).unwrap_err();
        assert!(matches!(err, GridError::MissingRowId { index: 4, .. }));

        let err = JsonRecord::from_value(json!({"id": null}), "id", 0).unwrap_err();
        assert!(matches!(err, GridError::MissingRowId { .. }));

        let err = JsonRecord::from_value(json!([1, 2]), "id", 0).unwrap_err();
        assert!(matches!(err, GridError::MissingRowId { .. }));
    }
}
