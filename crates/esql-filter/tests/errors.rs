//! Filter error reporting

mod common;

use esql_diagnostics::{
    ESQL0001, ESQL0002, ESQL0003, ESQL0004, ESQL0005, ESQL0006, ESQL0007, ESQL0008, ESQL0009,
    ESQL0010, ESQL0012, ESQL0100, ESQL0101, ESQL0102, ESQL0103, ESQL0104, ErrorCode, EsqlError, Span,
};
use esql_filter::{FilterParser, MAX_DEPTH};
use esql_types::Dialect;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn parse_err(dialect: Dialect, text: &str) -> EsqlError {
    let resolver = common::resolver(dialect);
    let car = resolver.resolve("Car").unwrap();
    FilterParser::new(&resolver).parse(text, &car).unwrap_err()
}

#[rstest]
#[case::empty("", ESQL0008)]
#[case::blank("   ", ESQL0008)]
#[case::bare_condition("price.gt.1", ESQL0009)]
#[case::unclosed_group("and(price.gt.1", ESQL0003)]
#[case::unclosed_list("and(name.in.(1,2)", ESQL0003)]
#[case::unclosed_value_list("and(name.in.(1,2", ESQL0003)]
#[case::trailing("and(price.gt.1))", ESQL0004)]
#[case::trailing_group("and(price.gt.1)or(sold.is.true)", ESQL0004)]
#[case::unknown_operator("and(price.greater.1)", ESQL0005)]
#[case::unterminated_quote("and(name.eq.\"abc)", ESQL0006)]
#[case::empty_group("and()", ESQL0007)]
#[case::list_without_in("and(price.eq.(1,2))", ESQL0010)]
#[case::missing_value("and(price.gt.)", ESQL0001)]
#[case::missing_dot("and(price gt 1)", ESQL0001)]
#[case::truncated("and(price.gt.", ESQL0002)]
#[case::missing_operator("and(price", ESQL0002)]
fn test_syntax_errors(#[case] text: &str, #[case] code: ErrorCode) {
    let err = parse_err(Dialect::Postgres, text);
    assert_eq!(err.code(), code, "{text}: {err}");
    assert!(err.is_client_error());
}

fn nested(depth: usize) -> String {
    format!("{}price.eq.1{}", "and(".repeat(depth), ")".repeat(depth))
}

#[rstest]
#[case::one_past_limit(MAX_DEPTH + 1)]
#[case::thousand(1_000)]
#[case::twenty_thousand(20_000)]
fn test_deep_nesting_is_rejected(#[case] depth: usize) {
    let err = parse_err(Dialect::Postgres, &nested(depth));

    assert_eq!(err.code(), ESQL0012);
    assert!(err.is_client_error());
    assert_eq!(err.span().map(|s| s.start), Some(4 * MAX_DEPTH));
}

#[test]
fn test_nesting_up_to_limit_is_accepted() {
    let resolver = common::resolver(Dialect::Postgres);
    let car = resolver.resolve("Car").unwrap();
    let parsed = FilterParser::new(&resolver).parse(&nested(MAX_DEPTH), &car).unwrap();

    assert_eq!(parsed.parameters.len(), 1);
}

#[test]
fn test_syntax_error_position() {
    let err = parse_err(Dialect::Postgres, "and(price.between.1)");

    assert!(matches!(err, EsqlError::Syntax { position: 10, .. }));
    assert_eq!(err.span(), Some(Span::new(10, 17)));
    assert_eq!(err.to_string(), "ESQL0005: unknown operator 'between' at position 10");
}

#[test]
fn test_unknown_column() {
    let err = parse_err(Dialect::Postgres, "and(price.gt.1,mileage.lt.5)");

    assert_eq!(err.code(), ESQL0100);
    assert_eq!(err.span(), Some(Span::new(15, 22)));
}

#[test]
fn test_relation_is_not_a_filter_column() {
    let err = parse_err(Dialect::Postgres, "and(model.eq.1)");
    assert!(matches!(err, EsqlError::UnknownColumn { ref column, .. } if column == "model"));
}

#[rstest]
#[case(Dialect::Sqlite, "and(name.ilike.a*)", "ILIKE")]
#[case(Dialect::Sqlite, "and(sold.is.true)", "IS")]
#[case(Dialect::Sqlite, "and(color.not.is.null)", "IS NOT")]
#[case(Dialect::MySql, "and(name.not.ilike.a*)", "NOT ILIKE")]
fn test_unsupported_operators(#[case] dialect: Dialect, #[case] text: &str, #[case] operator: &str) {
    let err = parse_err(dialect, text);

    assert_eq!(err.code(), ESQL0101);
    assert!(matches!(err, EsqlError::UnsupportedOperator { operator: ref op, .. } if op == operator));
}

#[test]
fn test_unsupported_operator_checked_before_value() {
    let err = parse_err(Dialect::Sqlite, "and(sold.is.maybe)");
    assert_eq!(err.code(), ESQL0101);
}

#[rstest]
#[case("and(sold.is.maybe)")]
#[case("and(sold.is.\"true\")")]
#[case("and(color.not.is.1)")]
fn test_is_requires_keyword(#[case] text: &str) {
    let err = parse_err(Dialect::Postgres, text);
    assert_eq!(err.code(), ESQL0103);
}

#[test]
fn test_in_requires_list() {
    let err = parse_err(Dialect::Postgres, "and(name.in.1)");
    assert_eq!(err.code(), ESQL0104);
}

#[test]
fn test_value_not_coercible() {
    let err = parse_err(Dialect::Postgres, "and(price.gt.cheap)");

    assert_eq!(err.code(), ESQL0102);
    assert_eq!(err.span(), Some(Span::new(13, 18)));
    assert!(matches!(err, EsqlError::InvalidValue { column: Some(ref c), .. } if c == "price"));
}

#[test]
fn test_invalid_date() {
    let err = parse_err(Dialect::Postgres, "and(releasedAt.eq.2024-13-45)");
    assert_eq!(err.code(), ESQL0102);
    assert!(err.to_string().contains("'2024-13-45' is not a valid date"));
}

#[test]
fn test_diagnostic_points_at_offending_token() {
    let source = "and(price.gt.1,\n    sold.is.maybe)";
    let err = parse_err(Dialect::Postgres, source);
    let diagnostic = err.to_diagnostic(source);
    let location = diagnostic.location.as_ref().unwrap();

    assert_eq!((location.line, location.column), (2, 13));
    assert!(diagnostic.render(source).contains("sold.is.maybe)"));
}
