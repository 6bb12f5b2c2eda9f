//! Flat result rows and typed column access
//!
//! A [`Row`] is one denormalized record as handed over by the fetch layer.
//! [`ColumnReader`] wraps a row with its entity kind and position so every
//! decoding failure carries enough context to locate the offending value.

use crate::error::{DecodeFault, DecodingError};
use crate::mapper::EntityKind;
use chrono::NaiveDateTime;
use std::fmt;
use std::sync::Arc;
use tracker_common::time::{parse_timestamp, to_iso8601_no_tz};

/// A single column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Storage type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
            Value::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
            Value::Blob(b) => write!(f, "<{} bytes>", b.len()),
            Value::Timestamp(ts) => write!(f, "{}", to_iso8601_no_tz(ts)),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One flat result row
///
/// Column names are shared between all rows of one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row from a shared column header and its values
    ///
    /// Values beyond the header length are ignored; missing trailing values
    /// read as absent columns.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Build a row from `(column, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    /// Value of `column`, or `None` if the row has no such column
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Iterate `(column, value)` pairs in header order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len().min(self.columns.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Enumerations decoded from a text column by case-insensitive lookup
pub trait ColumnEnum: Sized + Copy + 'static {
    /// Stored spelling of every variant
    const VARIANTS: &'static [(&'static str, Self)];

    fn from_column(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::VARIANTS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(raw))
            .map(|(_, variant)| *variant)
    }
}

/// Typed accessor over one row being decoded as `kind`
pub struct ColumnReader<'a> {
    row: &'a Row,
    kind: EntityKind,
    position: usize,
}

impl<'a> ColumnReader<'a> {
    pub fn new(row: &'a Row, kind: EntityKind, position: usize) -> Self {
        Self {
            row,
            kind,
            position,
        }
    }

    pub fn row(&self) -> &'a Row {
        self.row
    }

    /// Build a decoding error for `column` at this row
    pub fn fail(&self, column: &str, fault: DecodeFault) -> DecodingError {
        DecodingError {
            kind: self.kind,
            row: self.position,
            key: None,
            column: column.to_string(),
            fault,
        }
    }

    fn incompatible(&self, column: &str, expected: &'static str, found: &Value) -> DecodingError {
        self.fail(
            column,
            DecodeFault::IncompatibleType {
                expected,
                found: found.type_name(),
            },
        )
    }

    /// Value of an optional column; absent and NULL both read as `None`
    fn optional(&self, column: &str) -> Option<&'a Value> {
        self.row.get(column).filter(|v| !v.is_null())
    }

    /// Text column that must be present and non-null
    pub fn required_str(&self, column: &str) -> Result<String, DecodingError> {
        match self.row.get(column) {
            None => Err(self.fail(column, DecodeFault::MissingColumn)),
            Some(Value::Null) => Err(self.fail(column, DecodeFault::NullValue)),
            Some(Value::Text(s)) => Ok(s.clone()),
            Some(other) => Err(self.incompatible(column, "text", other)),
        }
    }

    pub fn opt_str(&self, column: &str) -> Result<Option<String>, DecodingError> {
        match self.optional(column) {
            None => Ok(None),
            Some(Value::Text(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.incompatible(column, "text", other)),
        }
    }

    pub fn opt_i64(&self, column: &str) -> Result<Option<i64>, DecodingError> {
        match self.optional(column) {
            None => Ok(None),
            Some(Value::Integer(i)) => Ok(Some(*i)),
            Some(Value::Text(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.fail(column, DecodeFault::UnknownValue(s.clone()))),
            Some(other) => Err(self.incompatible(column, "integer", other)),
        }
    }

    /// Tri-state boolean: NULL or absent stays `None`
    pub fn opt_bool(&self, column: &str) -> Result<Option<bool>, DecodingError> {
        match self.optional(column) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::Integer(0)) => Ok(Some(false)),
            Some(Value::Integer(1)) => Ok(Some(true)),
            Some(Value::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Ok(Some(true)),
                "false" | "f" | "0" => Ok(Some(false)),
                _ => Err(self.fail(column, DecodeFault::UnknownValue(s.clone()))),
            },
            Some(other) => Err(self.incompatible(column, "boolean", other)),
        }
    }

    /// Boolean defaulting to `false` when NULL or absent
    pub fn bool_or_false(&self, column: &str) -> Result<bool, DecodingError> {
        Ok(self.opt_bool(column)?.unwrap_or(false))
    }

    /// Native timestamp
    pub fn timestamp(&self, column: &str) -> Result<Option<NaiveDateTime>, DecodingError> {
        match self.optional(column) {
            None => Ok(None),
            Some(Value::Timestamp(ts)) => Ok(Some(*ts)),
            Some(Value::Text(s)) => parse_timestamp(s)
                .map(Some)
                .ok_or_else(|| self.fail(column, DecodeFault::InvalidTimestamp(s.clone()))),
            Some(other) => Err(self.incompatible(column, "timestamp", other)),
        }
    }

    /// Timestamp rendered in the canonical no-timezone text form
    pub fn iso_timestamp(&self, column: &str) -> Result<Option<String>, DecodingError> {
        Ok(self.timestamp(column)?.as_ref().map(to_iso8601_no_tz))
    }

    pub fn blob(&self, column: &str) -> Result<Option<&'a [u8]>, DecodingError> {
        match self.optional(column) {
            None => Ok(None),
            Some(Value::Blob(b)) => Ok(Some(b.as_slice())),
            Some(other) => Err(self.incompatible(column, "blob", other)),
        }
    }

    /// Enumeration looked up case-insensitively; unknown spellings fail
    pub fn enumeration<T: ColumnEnum>(&self, column: &str) -> Result<Option<T>, DecodingError> {
        match self.opt_str(column)? {
            None => Ok(None),
            Some(raw) => T::from_column(&raw)
                .map(Some)
                .ok_or_else(|| self.fail(column, DecodeFault::UnknownValue(raw))),
        }
    }
}
