//! Filter benchmarks using divan
//!
//! Tokenizing, tree building and rendering of filter expressions.

use esql::filter::{FilterParser, parse_filter, tokenize};
use esql::{Dialect, SchemaRegistry, SchemaResolver};
use std::sync::Arc;

fn main() {
    divan::main();
}

const MAPPING: &str = r#"[
    {"name": "Car", "table": "car", "identifiers": ["id"],
     "fields": [
        {"name": "id", "type": "integer"},
        {"name": "name", "type": "string"},
        {"name": "color", "type": "string", "nullable": true},
        {"name": "price", "type": "integer"},
        {"name": "sold", "type": "boolean"}
     ]}
]"#;

const SIMPLE: &str = "and(price.gt.100)";
const NESTED: &str =
    "and(price.gt.1000,sold.is.false,or(name.not.eq.caddy,sold.is.true,and(price.lt.5,color.in.(red,blue,\"dark green\"))))";

fn wide(conditions: usize) -> String {
    let body: Vec<String> = (0..conditions).map(|i| format!("price.gt.{i}")).collect();
    format!("or({})", body.join(","))
}

fn resolver() -> SchemaResolver {
    let registry = SchemaRegistry::from_json(MAPPING).expect("mapping");
    SchemaResolver::new(Arc::new(registry), Dialect::Postgres)
}

mod lexing {
    use super::*;

    #[divan::bench]
    fn simple() -> usize {
        tokenize(divan::black_box(SIMPLE)).map_or(0, |t| t.len())
    }

    #[divan::bench]
    fn nested() -> usize {
        tokenize(divan::black_box(NESTED)).map_or(0, |t| t.len())
    }
}

mod building {
    use super::*;

    #[divan::bench]
    fn nested() -> usize {
        parse_filter(divan::black_box(NESTED)).map_or(0, |g| g.depth())
    }

    #[divan::bench(args = [10, 100, 1000])]
    fn wide_group(bencher: divan::Bencher, conditions: usize) {
        let text = wide(conditions);
        bencher.bench_local(|| parse_filter(divan::black_box(&text)));
    }
}

mod rendering {
    use super::*;

    #[divan::bench]
    fn nested(bencher: divan::Bencher) {
        let resolver = resolver();
        let car = resolver.resolve("Car").expect("car");
        let parser = FilterParser::new(&resolver);
        bencher.bench_local(|| parser.parse(divan::black_box(NESTED), &car));
    }

    #[divan::bench(args = [10, 100])]
    fn wide_group(bencher: divan::Bencher, conditions: usize) {
        let resolver = resolver();
        let car = resolver.resolve("Car").expect("car");
        let parser = FilterParser::new(&resolver);
        let text = wide(conditions);
        bencher.bench_local(|| parser.parse(divan::black_box(&text), &car));
    }
}
