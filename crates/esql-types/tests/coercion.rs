//! Coercion of filter and JSON input into column types
//!
//! Covers the conversions the filter translator relies on:
//! - numeric text into integer/float/decimal columns
//! - booleans per dialect
//! - temporal normalization
//! - rejection of malformed input

use esql_types::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;
use std::str::FromStr;

fn postgres() -> TypeCoercer {
    TypeCoercer::new(Dialect::Postgres)
}

// === Numeric Coercions ===

#[rstest]
#[case(ColumnType::Integer, "100", SqlValue::Integer(100))]
#[case(ColumnType::Integer, " -7 ", SqlValue::Integer(-7))]
#[case(ColumnType::Float, "10.5", SqlValue::Float(10.5))]
#[case(ColumnType::Decimal, "19.99", SqlValue::Decimal(Decimal::from_str("19.99").unwrap()))]
#[case(ColumnType::Decimal, "1e3", SqlValue::Decimal(Decimal::from(1000)))]
fn test_numeric_text(#[case] column: ColumnType, #[case] input: &str, #[case] expected: SqlValue) {
    assert_eq!(postgres().coerce(&column, SqlValue::from(input)).unwrap(), expected);
}

#[rstest]
#[case(ColumnType::Integer, "ten")]
#[case(ColumnType::Integer, "1.5")]
#[case(ColumnType::Float, "NaN")]
#[case(ColumnType::Decimal, "12,5")]
fn test_numeric_text_rejected(#[case] column: ColumnType, #[case] input: &str) {
    let err = postgres().coerce(&column, SqlValue::from(input)).unwrap_err();
    assert!(matches!(err, CoercionError::InvalidFormat { .. }), "{err}");
}

#[test]
fn test_integer_into_decimal_column() {
    assert_eq!(
        postgres().coerce(&ColumnType::Decimal, SqlValue::Integer(90)).unwrap(),
        SqlValue::Decimal(Decimal::from(90))
    );
}

// === Booleans ===

#[rstest]
#[case("true", true)]
#[case("False", false)]
#[case("1", true)]
#[case("no", false)]
fn test_boolean_text(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(
        postgres().coerce(&ColumnType::Boolean, SqlValue::from(input)).unwrap(),
        SqlValue::Bool(expected)
    );
}

#[test]
fn test_boolean_rejects_other_integers() {
    let err = postgres()
        .coerce(&ColumnType::Boolean, SqlValue::Integer(2))
        .unwrap_err();
    assert!(matches!(err, CoercionError::CannotConvert { kind: "integer", .. }));
}

// === Temporal ===

#[rstest]
#[case(ColumnType::Date, "2024-03-15", "2024-03-15")]
#[case(ColumnType::Date, "2024-03-15T10:30:00Z", "2024-03-15")]
#[case(ColumnType::DateTime, "2024-03-15T10:30:00+02:00", "2024-03-15 10:30:00")]
#[case(ColumnType::DateTime, "2024-03-15 10:30", "2024-03-15 10:30:00")]
#[case(ColumnType::DateTime, "2024-03-15", "2024-03-15 00:00:00")]
#[case(ColumnType::Time, "08:15", "08:15:00")]
fn test_temporal_normalized(
    #[case] column: ColumnType,
    #[case] input: &str,
    #[case] expected: &str,
) {
    assert_eq!(
        postgres().coerce(&column, SqlValue::from(input)).unwrap(),
        SqlValue::Text(expected.to_string())
    );
}

#[test]
fn test_unix_timestamp_datetime() {
    assert_eq!(
        postgres()
            .coerce(&ColumnType::DateTime, SqlValue::Integer(0))
            .unwrap(),
        SqlValue::Text("1970-01-01 00:00:00".to_string())
    );
}

#[test]
fn test_invalid_date() {
    let err = postgres()
        .coerce(&ColumnType::Date, SqlValue::from("2024-13-45"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "'2024-13-45' is not a valid date (expected YYYY-MM-DD)"
    );
}

// === Pass-through ===

#[test]
fn test_custom_type_passes_through() {
    let value = SqlValue::from("POINT(1 2)");
    assert_eq!(
        postgres()
            .coerce(&ColumnType::from("geometry"), value.clone())
            .unwrap(),
        value
    );
}

#[test]
fn test_string_column_stringifies() {
    assert_eq!(
        postgres().coerce(&ColumnType::String, SqlValue::Integer(1)).unwrap(),
        SqlValue::Text("1".to_string())
    );
}

proptest! {
    #[test]
    fn prop_integer_text_coerces_exactly(n in any::<i64>()) {
        let coerced = postgres().coerce(&ColumnType::Integer, SqlValue::Text(n.to_string())).unwrap();
        prop_assert_eq!(coerced, SqlValue::Integer(n));
    }
}
