//! Filter invariants over generated input

mod common;

use esql_filter::{FilterParser, parse_filter};
use esql_types::Dialect;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn condition() -> impl Strategy<Value = String> {
    prop_oneof![
        (prop::sample::select(vec!["eq", "neq", "gt", "gte", "lt", "lte", "not.gt"]), 0..10_000i64)
            .prop_map(|(op, n)| format!("price.{op}.{n}")),
        (prop::sample::select(vec!["like", "ilike", "not.like"]), "[a-z*]{1,6}")
            .prop_map(|(op, v)| format!("name.{op}.{v}")),
        prop::collection::vec("[a-z0-9]{1,5}", 1..5)
            .prop_map(|values| format!("name.in.({})", values.join(","))),
        prop::sample::select(vec!["true", "false", "null"]).prop_map(|v| format!("sold.is.{v}")),
    ]
}

fn filter() -> impl Strategy<Value = String> {
    let leaf = prop::collection::vec(condition(), 1..4);
    let group = (prop::bool::ANY, leaf).prop_map(|(and, children)| {
        format!("{}({})", if and { "and" } else { "or" }, children.join(","))
    });
    group.prop_recursive(3, 16, 3, |inner| {
        (prop::bool::ANY, prop::collection::vec(prop_oneof![inner, condition()], 1..4)).prop_map(
            |(and, children)| format!("{}({})", if and { "and" } else { "or" }, children.join(",")),
        )
    })
}

fn placeholders(sql: &str) -> BTreeSet<String> {
    sql.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == ':'))
        .filter_map(|word| word.strip_prefix(':'))
        .map(str::to_string)
        .collect()
}

proptest! {
    #[test]
    fn placeholders_match_parameters(text in filter()) {
        let resolver = common::resolver(Dialect::Postgres);
        let car = resolver.resolve("Car").unwrap();
        let parsed = FilterParser::new(&resolver).parse(&text, &car).unwrap();

        let keys: BTreeSet<String> = parsed.parameters.keys().cloned().collect();
        prop_assert_eq!(placeholders(&parsed.sql), keys);
    }

    #[test]
    fn in_binds_one_parameter_per_value(values in prop::collection::vec("[a-z0-9]{1,5}", 1..8)) {
        let resolver = common::resolver(Dialect::Postgres);
        let car = resolver.resolve("Car").unwrap();
        let text = format!("and(name.in.({}))", values.join(","));
        let parsed = FilterParser::new(&resolver).parse(&text, &car).unwrap();

        prop_assert_eq!(parsed.parameters.len(), values.len());
    }

    #[test]
    fn display_reparses_to_same_tree(text in filter()) {
        let group = parse_filter(&text).unwrap();
        prop_assert_eq!(parse_filter(&group.to_string()).unwrap().to_string(), group.to_string());
    }

    #[test]
    fn arbitrary_input_never_panics(text in "\\PC{0,40}") {
        let resolver = common::resolver(Dialect::Sqlite);
        let car = resolver.resolve("Car").unwrap();
        let _ = FilterParser::new(&resolver).parse(&text, &car);
    }
}
