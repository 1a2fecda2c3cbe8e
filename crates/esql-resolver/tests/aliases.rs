//! Alias allocation properties

mod common;

use esql_resolver::{AliasNode, normalize};
use insta::assert_snapshot;
use proptest::prelude::*;
use std::collections::HashSet;

proptest! {
    #[test]
    fn distinct_relations_get_distinct_aliases(
        fields in prop::collection::hash_set("[a-zA-Z][a-zA-Z0-9_]{0,10}", 1..8)
    ) {
        let root = AliasNode::root("Root", "Root");
        let candidates: Vec<&str> = fields.iter().map(String::as_str).collect();

        let mut seen = HashSet::new();
        for _ in 0..candidates.len() {
            let node = root.claim_relation(&candidates, "Target").unwrap();
            prop_assert!(node.full().starts_with("root_"));
            prop_assert!(seen.insert(node.full().to_string()));
        }
        prop_assert!(root.claim_relation(&candidates, "Target").is_none());
    }

    #[test]
    fn normalized_names_are_lowercase_alphanumeric(raw in "[ -~]{0,24}") {
        let normalized = normalize(&raw);
        prop_assert!(normalized.chars().all(|c| c.is_alphanumeric() && !c.is_uppercase()));
    }
}

#[test]
fn test_alias_tree_debug() {
    let resolver = common::resolver();
    let product = resolver.resolve("Product").unwrap();
    let category = resolver.traverse(&product, "Category", None).unwrap();
    resolver.traverse(&category, "Category", None).unwrap();

    let aliases: Vec<String> = product
        .node()
        .children()
        .iter()
        .flat_map(|child| {
            let nested: Vec<String> = child
                .children()
                .into_iter()
                .map(|c| c.full().to_string())
                .collect();
            std::iter::once(child.full().to_string()).chain(nested)
        })
        .collect();

    assert_snapshot!(aliases.join("\n"), @r"
    product_categoryrelation
    product_categoryrelation_parent
    ");
}
