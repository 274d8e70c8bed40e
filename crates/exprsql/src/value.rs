//! Literal value formatting.
//!
//! [`SqlValue`] is the single runtime value representation shared by the
//! predicate analyzer and the batch DML generator. [`SqlValue::render`] turns
//! a value into SQL-safe literal text: strings are single-quoted with embedded
//! quotes doubled, booleans become `1`/`0`, date/time values are quoted in
//! their default textual form, and `Null` renders as `NULL`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A typed runtime value destined for a SQL literal position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SqlValue {
    /// SQL NULL
    Null,
    /// Boolean, rendered as `1` / `0`
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text, rendered single-quoted with `'` doubled
    Text(String),
    /// Calendar date, rendered quoted
    Date(NaiveDate),
    /// Date and time, rendered quoted
    DateTime(NaiveDateTime),
    /// UUID, rendered quoted
    Uuid(Uuid),
    /// JSON document, rendered as quoted serialized text
    Json(serde_json::Value),
}

/// Double every single quote so the result re-parses to the original string.
pub(crate) fn escape_str(s: &str) -> String {
    s.replace('\'', "''")
}

impl SqlValue {
    /// Render the value as SQL literal text.
    pub fn render(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Text(s) => format!("'{}'", escape_str(s)),
            SqlValue::Date(d) => format!("'{d}'"),
            SqlValue::DateTime(dt) => format!("'{dt}'"),
            SqlValue::Uuid(u) => format!("'{u}'"),
            SqlValue::Json(v) => format!("'{}'", escape_str(&v.to_string())),
        }
    }

    /// Whether this value is the SQL NULL constant.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// The raw text carried by a `Text` value, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

macro_rules! int_from {
    ($($t:ty),*) => {
        $(impl From<$t> for SqlValue {
            fn from(v: $t) -> Self {
                SqlValue::Int(v as i64)
            }
        })*
    };
}

int_from!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        SqlValue::Float(v as f64)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::DateTime(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::DateTime(v.naive_utc())
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(v: serde_json::Value) -> Self {
        SqlValue::Json(v)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

/// By-reference conversion into [`SqlValue`].
///
/// The derive macro calls this on every field when building a row's value
/// tuple, so record types do not need `Clone` fields boxed through `From`.
pub trait ToSqlValue {
    fn to_sql_value(&self) -> SqlValue;
}

macro_rules! to_sql_value_via_from {
    ($($t:ty),*) => {
        $(impl ToSqlValue for $t {
            fn to_sql_value(&self) -> SqlValue {
                SqlValue::from(*self)
            }
        })*
    };
}

to_sql_value_via_from!(i8, i16, i32, i64, u8, u16, u32, f32, f64, bool, NaiveDate, NaiveDateTime, Uuid);

impl ToSqlValue for String {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::DateTime(self.naive_utc())
    }
}

impl ToSqlValue for serde_json::Value {
    fn to_sql_value(&self) -> SqlValue {
        SqlValue::Json(self.clone())
    }
}

impl<T> ToSqlValue for Option<T>
where
    T: ToSqlValue,
{
    fn to_sql_value(&self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}
