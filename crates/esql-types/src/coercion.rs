//! Value coercion
//!
//! Converts loosely typed caller input (filter text, JSON) into the value a
//! driver expects for a column's declared type, the way Doctrine's
//! `convertToDatabaseValue` does per platform:
//! - numbers are parsed from text and range-checked
//! - booleans become native booleans or 0/1 depending on the dialect
//! - temporal values are normalized to ISO text
//! - `json` columns receive JSON text

use crate::{ColumnType, Dialect, SqlValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_FORMAT: &str = "%H:%M:%S";

const DATETIME_INPUTS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Coercion errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    /// The value kind has no conversion to the column type
    #[error("cannot convert {kind} value '{value}' to {to}")]
    CannotConvert {
        kind: &'static str,
        value: String,
        to: String,
    },

    /// Text that does not parse as the column type
    #[error("'{value}' is not a valid {to} (expected {expected})")]
    InvalidFormat {
        value: String,
        to: String,
        expected: &'static str,
    },

    #[error("{value} is out of range for {to}")]
    OutOfRange { value: String, to: String },
}

pub type CoercionResult<T> = Result<T, CoercionError>;

/// Dialect-aware coercion of values into column types
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCoercer {
    dialect: Dialect,
}

impl TypeCoercer {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Convert `value` into the database representation of `column_type`.
    ///
    /// Null always passes through.
    pub fn coerce(&self, column_type: &ColumnType, value: SqlValue) -> CoercionResult<SqlValue> {
        if value.is_null() {
            return Ok(SqlValue::Null);
        }
        match column_type {
            ColumnType::Integer => to_integer(value).map(SqlValue::Integer),
            ColumnType::Float => to_float(value).map(SqlValue::Float),
            ColumnType::Decimal => to_decimal(value).map(SqlValue::Decimal),
            ColumnType::Boolean => to_bool(value).map(|b| self.bool_value(b)),
            ColumnType::String => Ok(match value {
                SqlValue::Text(s) => SqlValue::Text(s),
                other => SqlValue::Text(other.to_string()),
            }),
            ColumnType::Date => to_date(value).map(|d| SqlValue::Text(d.format(DATE_FORMAT).to_string())),
            ColumnType::DateTime => {
                to_datetime(value).map(|dt| SqlValue::Text(dt.format(DATETIME_FORMAT).to_string()))
            }
            ColumnType::Time => to_time(value).map(|t| SqlValue::Text(t.format(TIME_FORMAT).to_string())),
            ColumnType::Json => Ok(SqlValue::Text(to_json_text(value))),
            ColumnType::Other(_) => Ok(value),
        }
    }

    fn bool_value(&self, value: bool) -> SqlValue {
        if self.dialect.has_native_bool() {
            SqlValue::Bool(value)
        } else {
            SqlValue::Integer(i64::from(value))
        }
    }
}

fn cannot_convert(value: &SqlValue, to: &ColumnType) -> CoercionError {
    CoercionError::CannotConvert {
        kind: value.kind(),
        value: value.to_string(),
        to: to.to_string(),
    }
}

fn invalid(value: &str, to: ColumnType, expected: &'static str) -> CoercionError {
    CoercionError::InvalidFormat {
        value: value.to_string(),
        to: to.to_string(),
        expected,
    }
}

fn to_integer(value: SqlValue) -> CoercionResult<i64> {
    let out_of_range = |v: &dyn ToString| CoercionError::OutOfRange {
        value: v.to_string(),
        to: ColumnType::Integer.to_string(),
    };
    match value {
        SqlValue::Integer(i) => Ok(i),
        SqlValue::Bool(b) => Ok(i64::from(b)),
        SqlValue::Float(f) if f.fract() == 0.0 => {
            Decimal::try_from(f)
                .ok()
                .and_then(|d| d.to_i64())
                .ok_or_else(|| out_of_range(&f))
        }
        SqlValue::Decimal(d) if d.fract().is_zero() => d.to_i64().ok_or_else(|| out_of_range(&d)),
        SqlValue::Text(ref s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .map_err(|_| invalid(trimmed, ColumnType::Integer, "a whole number"))
        }
        other => Err(cannot_convert(&other, &ColumnType::Integer)),
    }
}

fn to_float(value: SqlValue) -> CoercionResult<f64> {
    match value {
        SqlValue::Float(f) => Ok(f),
        // lossy above 2^53
        SqlValue::Integer(i) => Ok(i as f64),
        SqlValue::Decimal(d) => d
            .to_f64()
            .ok_or_else(|| cannot_convert(&SqlValue::Decimal(d), &ColumnType::Float)),
        SqlValue::Text(ref s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .ok_or_else(|| invalid(trimmed, ColumnType::Float, "a number"))
        }
        other => Err(cannot_convert(&other, &ColumnType::Float)),
    }
}

fn to_decimal(value: SqlValue) -> CoercionResult<Decimal> {
    match value {
        SqlValue::Decimal(d) => Ok(d),
        SqlValue::Integer(i) => Ok(Decimal::from(i)),
        SqlValue::Float(f) => Decimal::try_from(f).map_err(|_| CoercionError::OutOfRange {
            value: f.to_string(),
            to: ColumnType::Decimal.to_string(),
        }),
        SqlValue::Text(ref s) => {
            let trimmed = s.trim();
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map_err(|_| invalid(trimmed, ColumnType::Decimal, "a decimal number"))
        }
        other => Err(cannot_convert(&other, &ColumnType::Decimal)),
    }
}

fn to_bool(value: SqlValue) -> CoercionResult<bool> {
    match value {
        SqlValue::Bool(b) => Ok(b),
        SqlValue::Integer(0) => Ok(false),
        SqlValue::Integer(1) => Ok(true),
        SqlValue::Text(ref s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "yes" | "on" => Ok(true),
            "false" | "f" | "0" | "no" | "off" => Ok(false),
            _ => Err(invalid(s, ColumnType::Boolean, "true or false")),
        },
        other => Err(cannot_convert(&other, &ColumnType::Boolean)),
    }
}

fn to_date(value: SqlValue) -> CoercionResult<NaiveDate> {
    match value {
        SqlValue::Text(ref s) => {
            let trimmed = s.trim();
            NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .or_else(|_| parse_datetime(trimmed).map(|dt| dt.date()).ok_or(()))
                .map_err(|_| invalid(trimmed, ColumnType::Date, "YYYY-MM-DD"))
        }
        other => to_datetime(other).map(|dt| dt.date()),
    }
}

fn to_datetime(value: SqlValue) -> CoercionResult<NaiveDateTime> {
    match value {
        SqlValue::Text(ref s) => {
            let trimmed = s.trim();
            parse_datetime(trimmed)
                .or_else(|| {
                    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
                .ok_or_else(|| invalid(trimmed, ColumnType::DateTime, "YYYY-MM-DD HH:MM:SS or RFC 3339"))
        }
        SqlValue::Integer(secs) => DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| CoercionError::OutOfRange {
                value: secs.to_string(),
                to: ColumnType::DateTime.to_string(),
            }),
        other => Err(cannot_convert(&other, &ColumnType::DateTime)),
    }
}

fn to_time(value: SqlValue) -> CoercionResult<NaiveTime> {
    match value {
        SqlValue::Text(ref s) => {
            let trimmed = s.trim();
            NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
                .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
                .map_err(|_| invalid(trimmed, ColumnType::Time, "HH:MM:SS"))
        }
        other => Err(cannot_convert(&other, &ColumnType::Time)),
    }
}

/// Text that already is a JSON document is kept, anything else is encoded
fn to_json_text(value: SqlValue) -> String {
    match value {
        SqlValue::Text(s) if serde_json::from_str::<serde_json::Value>(&s).is_ok() => s,
        other => other.to_json().to_string(),
    }
}

/// RFC 3339 keeps the wall-clock time of its own offset
fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_local());
    }
    DATETIME_INPUTS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(Dialect::Postgres, SqlValue::Bool(true))]
    #[case(Dialect::Generic, SqlValue::Bool(true))]
    #[case(Dialect::MySql, SqlValue::Integer(1))]
    #[case(Dialect::Sqlite, SqlValue::Integer(1))]
    fn test_boolean_per_dialect(#[case] dialect: Dialect, #[case] expected: SqlValue) {
        let coercer = TypeCoercer::new(dialect);
        assert_eq!(
            coercer.coerce(&ColumnType::Boolean, SqlValue::Bool(true)).unwrap(),
            expected
        );
        assert_eq!(
            coercer.coerce(&ColumnType::Boolean, SqlValue::from("TRUE")).unwrap(),
            expected
        );
    }

    #[test]
    fn test_null_passes_through_every_type() {
        let coercer = TypeCoercer::new(Dialect::Postgres);
        for column_type in [ColumnType::Integer, ColumnType::Boolean, ColumnType::Json] {
            assert_eq!(coercer.coerce(&column_type, SqlValue::Null).unwrap(), SqlValue::Null);
        }
    }

    #[test]
    fn test_json_text_kept_or_encoded() {
        let coercer = TypeCoercer::default();
        assert_eq!(
            coercer.coerce(&ColumnType::Json, SqlValue::from(r#"{"a":1}"#)).unwrap(),
            SqlValue::Text(r#"{"a":1}"#.into())
        );
        assert_eq!(
            coercer.coerce(&ColumnType::Json, SqlValue::from("plain")).unwrap(),
            SqlValue::Text(r#""plain""#.into())
        );
    }

    #[test]
    fn test_float_with_fraction_is_not_an_integer() {
        let coercer = TypeCoercer::default();
        assert!(matches!(
            coercer.coerce(&ColumnType::Integer, SqlValue::Float(1.5)),
            Err(CoercionError::CannotConvert { .. })
        ));
        assert_eq!(
            coercer.coerce(&ColumnType::Integer, SqlValue::Float(3.0)).unwrap(),
            SqlValue::Integer(3)
        );
    }
}
