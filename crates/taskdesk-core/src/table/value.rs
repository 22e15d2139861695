//! Records, cell values and column descriptors.
//!
//! Records expose their fields through an explicit accessor instead of
//! dynamic indexing. Every field a record returns from [`Record::values`]
//! participates in search; [`Record::field`] backs filtering and sorting.

use std::cmp::Ordering;
use std::fmt;

use serde_json::{Map, Value};

/// A uniquely identified row of tabular data.
pub trait Record: Clone {
    /// Identifier, unique across the collection and stable for the record's lifetime.
    fn id(&self) -> &str;

    /// Value of the field named `key`, or `None` if the record has no such field.
    fn field(&self, key: &str) -> Option<CellValue>;

    /// Raw values of all own fields.
    fn values(&self) -> Vec<CellValue>;
}

/// A single field value as seen by the table engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<CellValue>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn class_rank(&self) -> u8 {
        match self {
            CellValue::Bool(_) => 0,
            CellValue::Int(_) | CellValue::Float(_) => 1,
            CellValue::Text(_) => 2,
            CellValue::List(_) => 3,
            CellValue::Null => 4,
        }
    }

    /// Total ordering used for sorting.
    ///
    /// Numbers compare numerically, text lexically and booleans false < true.
    /// Values of different kinds order by kind: booleans, numbers, text, lists,
    /// then nulls last.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::List(_), CellValue::List(_)) => self.to_string().cmp(&other.to_string()),
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.class_rank().cmp(&b.class_rank()),
            },
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{}", *v as i64),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(s) => f.write_str(s),
            CellValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl From<&Value> for CellValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => CellValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => CellValue::Text(s.clone()),
            Value::Array(items) => CellValue::List(items.iter().map(CellValue::from).collect()),
            // Nested objects stay searchable through their raw JSON text
            Value::Object(_) => CellValue::Text(value.to_string()),
        }
    }
}

/// A record of arbitrary shape backed by a JSON object.
///
/// The identifier is read from `id`, falling back to `_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRecord {
    id: String,
    fields: Map<String, Value>,
}

impl JsonRecord {
    /// Wrap a JSON value. Returns `None` for non-objects or objects without an id.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(fields) = value else {
            return None;
        };
        let id = ["id", "_id"].iter().find_map(|key| match fields.get(*key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })?;
        Some(Self { id, fields })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl Record for JsonRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, key: &str) -> Option<CellValue> {
        self.fields.get(key).map(CellValue::from)
    }

    fn values(&self) -> Vec<CellValue> {
        self.fields.values().map(CellValue::from).collect()
    }
}

/// Describes how a field is displayed, sorted and filtered.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor<R> {
    pub key: String,
    pub title: String,
    pub sortable: bool,
    pub class_name: Option<String>,
    /// Custom cell text; defaults to the stringified field value.
    pub render: Option<fn(&R) -> String>,
}

impl<R: Record> ColumnDescriptor<R> {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            sortable: true,
            class_name: None,
            render: None,
        }
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_render(mut self, render: fn(&R) -> String) -> Self {
        self.render = Some(render);
        self
    }

    /// The value sorting and filtering see for this column.
    pub fn value(&self, record: &R) -> CellValue {
        record.field(&self.key).unwrap_or_default()
    }

    pub fn cell_text(&self, record: &R) -> String {
        match self.render {
            Some(render) => render(record),
            None => self.value(record).to_string(),
        }
    }
}
