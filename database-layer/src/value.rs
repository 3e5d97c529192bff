// Scalar field values used for filtering and sorting
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Storage type of an entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    Int,
    Decimal,
    Text,
    Uuid,
    Date,
    DateTime,
}

impl FieldKind {
    pub fn is_text(self) -> bool {
        matches!(self, FieldKind::Text)
    }

    /// Parse a filter operand written as a string into a value of this kind
    pub fn parse(self, raw: &str) -> Option<FieldValue> {
        let raw = raw.trim();
        match self {
            FieldKind::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Some(FieldValue::Bool(true)),
                "false" | "0" => Some(FieldValue::Bool(false)),
                _ => None,
            },
            FieldKind::Int => raw.parse().ok().map(FieldValue::Int),
            FieldKind::Decimal => Decimal::from_str(raw).ok().map(FieldValue::Decimal),
            // Text keeps surrounding whitespace out of the comparison as well
            FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
            FieldKind::Uuid => Uuid::parse_str(raw).ok().map(FieldValue::Uuid),
            FieldKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(FieldValue::Date),
            FieldKind::DateTime => DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                        .ok()
                        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
                })
                .map(FieldValue::DateTime),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Decimal => "decimal",
            FieldKind::Text => "text",
            FieldKind::Uuid => "uuid",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// A field value read off an entity through its accessor table
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Ordering for comparisons: `None` when either side is null or the kinds differ
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Bool(b)) => Some(a.cmp(b)),
            (FieldValue::Int(a), FieldValue::Int(b)) => Some(a.cmp(b)),
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => Some(a.cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => Some(a.cmp(b)),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total ordering used for sorting; nulls sort first
    pub fn sort_cmp(&self, other: &FieldValue) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(i64::from(v))
    }
}

impl From<Decimal> for FieldValue {
    fn from(v: Decimal) -> Self {
        FieldValue::Decimal(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<Uuid> for FieldValue {
    fn from(v: Uuid) -> Self {
        FieldValue::Uuid(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        FieldValue::Date(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::DateTime(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}
