// SPDX-FileCopyrightText: 2026 Parcelhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document model shared by every store backend.
//!
//! Records are JSON objects keyed by `_id`. Queries are conjunctions of
//! [`Condition`]s; a missing field compares as JSON `null`. Backends must give
//! [`Filter::matches`] and [`Sort::compare`] the same meaning, whether they
//! evaluate in Rust or compile to SQL.

use std::cmp::Ordering;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

use crate::error::ParcelError;

/// A stored record.
pub type Document = serde_json::Map<String, Value>;

/// Identity field present on every document.
pub const ID_FIELD: &str = "_id";

/// The five record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    Parcels,
    Payments,
    Users,
    Riders,
    Trackings,
}

/// Field names must be plain identifiers; they end up inside JSON paths.
pub fn is_valid_field(field: &str) -> bool {
    !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A single equality-style predicate on one top-level field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value exactly.
    Eq { field: String, value: Value },
    /// Field is a string equal to `value`, ASCII case-insensitively.
    EqIgnoreCase { field: String, value: String },
    /// Field equals any of the values. `Value::Null` matches a missing field.
    OneOf { field: String, values: Vec<Value> },
}

impl Condition {
    pub fn field(&self) -> &str {
        match self {
            Self::Eq { field, .. } | Self::EqIgnoreCase { field, .. } | Self::OneOf { field, .. } => {
                field
            }
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        let actual = doc.get(self.field()).unwrap_or(&Value::Null);
        match self {
            Self::Eq { value, .. } => values_equal(actual, value),
            Self::EqIgnoreCase { value, .. } => actual
                .as_str()
                .is_some_and(|s| s.eq_ignore_ascii_case(value)),
            Self::OneOf { values, .. } => values.iter().any(|v| values_equal(actual, v)),
        }
    }
}

/// Conjunction of conditions. The empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on the document identity.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq(ID_FIELD, id.into())
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn eq_ignore_case(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::EqIgnoreCase {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn one_of<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.conditions.push(Condition::OneOf {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }

    /// Rejects field names that are not plain identifiers.
    pub fn validate(&self) -> Result<(), ParcelError> {
        for condition in &self.conditions {
            if !is_valid_field(condition.field()) {
                return Err(ParcelError::InvalidArgument(format!(
                    "invalid filter field `{}`",
                    condition.field()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Single-field sort applied on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let left = a.get(&self.field).unwrap_or(&Value::Null);
        let right = b.get(&self.field).unwrap_or(&Value::Null);
        let ord = compare_values(left, right);
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// Outcome of an `update_one` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// Documents matched by the filter (0 or 1).
    pub matched: u64,
    /// Documents whose content actually changed (0 or 1).
    pub modified: u64,
}

/// Applies `$set`-style assignments. Returns whether anything changed.
pub fn apply_set(doc: &mut Document, set: &Document) -> bool {
    let mut changed = false;
    for (key, value) in set {
        if doc.get(key) != Some(value) {
            doc.insert(key.clone(), value.clone());
            changed = true;
        }
    }
    changed
}

/// Rejects update sets that touch `_id` or use invalid field names.
pub fn validate_set(set: &Document) -> Result<(), ParcelError> {
    for key in set.keys() {
        if key == ID_FIELD {
            return Err(ParcelError::InvalidArgument(
                "document identity cannot be updated".to_string(),
            ));
        }
        if !is_valid_field(key) {
            return Err(ParcelError::InvalidArgument(format!(
                "invalid update field `{key}`"
            )));
        }
    }
    Ok(())
}

/// Serializes a record into a document.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, ParcelError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(ParcelError::Internal(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Deserializes a document into a record.
pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, ParcelError> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Equality with numbers compared by value (`1` equals `1.0`).
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Total order over JSON values: null, then booleans and numbers by numeric
/// value (false = 0, true = 1), then strings, then anything else by its
/// serialized form.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) | Value::Number(_) => 1,
            Value::String(_) => 2,
            Value::Array(_) | Value::Object(_) => 3,
        }
    }
    fn numeric(v: &Value) -> f64 {
        match v {
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    match rank(a).cmp(&rank(b)) {
        Ordering::Equal => match (a, b) {
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Array(_) | Value::Object(_), _) => a.to_string().cmp(&b.to_string()),
            _ => numeric(a)
                .partial_cmp(&numeric(b))
                .unwrap_or(Ordering::Equal),
        },
        other => other,
    }
}
