//! Row mapper
//!
//! Rebuilds nested values from the flat, alias-prefixed rows produced by
//! [`SchemaResolver::columns`](crate::SchemaResolver::columns):
//!
//! ```text
//! {car_id: 1, car_model_id: 1, car_model_name: "Volkswagen"}
//!   -> {id: 1, model: {id: 1, name: "Volkswagen"}}
//! ```

use crate::alias::{AliasNode, KeyMetadata, normalize};
use crate::context::Context;
use crate::resolver::SchemaResolver;
use esql_diagnostics::{EsqlError, Result};
use esql_schema::SchemaType;
use indexmap::IndexMap;
use log::trace;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Intermediate tree: relations become branches, columns become leaves
#[derive(Debug)]
enum Slot {
    Leaf(Value),
    Branch(Branch),
}

#[derive(Debug, Default)]
struct Branch {
    schema: Option<Arc<SchemaType>>,
    entries: IndexMap<String, Slot>,
}

/// One level of the walk: the alias node (when the relation was traversed)
/// and the metadata of the type at that level
struct Level {
    node: Option<Arc<AliasNode>>,
    schema: Option<Arc<SchemaType>>,
}

pub struct RowMapper<'a> {
    resolver: &'a SchemaResolver,
}

impl<'a> RowMapper<'a> {
    pub fn new(resolver: &'a SchemaResolver) -> Self {
        Self { resolver }
    }

    /// Map a single row object or an array of rows
    pub fn map(&self, ctx: &Context, rows: &Value) -> Result<Value> {
        match rows {
            Value::Array(rows) => rows
                .iter()
                .map(|row| self.map_row(ctx, row))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            row => self.map_row(ctx, row),
        }
    }

    fn map_row(&self, ctx: &Context, row: &Value) -> Result<Value> {
        let Value::Object(columns) = row else {
            return Err(EsqlError::mapping(format!(
                "expected a row object, found {}",
                kind(row)
            )));
        };

        let prefix = format!("{}_", ctx.alias());
        let schema = Arc::clone(ctx.effective_arc());
        let mut root = Branch {
            schema: Some(Arc::clone(&schema)),
            entries: IndexMap::new(),
        };
        let level = Level {
            node: Some(Arc::clone(ctx.node())),
            schema: Some(schema),
        };

        // Keys handed down start at the alias segment of their level
        let own = ctx.alias().len() - ctx.node().normalized().len();
        for (key, value) in columns {
            if strip_prefix_ignore_case(key, &prefix).is_none() {
                trace!("skipping column {key}: not owned by {}", ctx.alias());
                continue;
            }
            self.insert(&level, &mut root, &key[own..], value.clone());
        }

        Ok(Value::Object(into_object(root.entries)))
    }

    /// Insert `key` (`<alias>_<field>`) below `branch`
    fn insert(&self, level: &Level, branch: &mut Branch, key: &str, value: Value) {
        let meta = match &level.node {
            Some(node) => node.metadata(key),
            None => KeyMetadata::parse(key, str::to_string),
        };

        if let Some(field) = level.schema.as_deref().and_then(|s| scalar_field(s, &meta.field)) {
            put_leaf(branch, field, value);
            return;
        }

        let Some(segment) = meta.segment.as_deref().filter(|_| meta.remainder.is_some()) else {
            let field = self
                .relation(level, &meta.field)
                .map_or_else(|| meta.field.clone(), |(field, _)| field);
            put_leaf(branch, field, value);
            return;
        };

        match self.relation(level, segment) {
            Some((field, child)) => {
                trace!("routing {key} into relation {field}");
                let slot = branch
                    .entries
                    .entry(field)
                    .or_insert_with(|| Slot::Branch(Branch::default()));
                if let Slot::Leaf(_) = slot {
                    *slot = Slot::Branch(Branch::default());
                }
                if let Slot::Branch(sub) = slot {
                    sub.schema.clone_from(&child.schema);
                    self.insert(&child, sub, &meta.field, value);
                }
            }
            None => put_leaf(branch, meta.field, value),
        }
    }

    /// Relation field a key segment stands for, and the level below it
    fn relation(&self, level: &Level, segment: &str) -> Option<(String, Level)> {
        let normalized = normalize(segment);
        if let Some(child) = level.node.as_ref().and_then(|node| node.get_child(&normalized)) {
            let field = child.aliased_name().to_string();
            let schema = self.resolver.try_schema(child.type_name());
            return Some((
                field,
                Level {
                    node: Some(child),
                    schema,
                },
            ));
        }

        let association = level
            .schema
            .as_deref()?
            .associations
            .iter()
            .find(|a| normalize(&a.field) == normalized)?;
        let node = level
            .node
            .as_ref()
            .and_then(|node| node.claimed(&association.field));
        Some((
            association.field.clone(),
            Level {
                node,
                schema: self.resolver.try_schema(&association.target),
            },
        ))
    }
}

fn scalar_field(schema: &SchemaType, key: &str) -> Option<String> {
    schema
        .field(key)
        .or_else(|| schema.fields.iter().find(|f| f.name.eq_ignore_ascii_case(key)))
        .map(|f| f.name.clone())
}

/// A leaf never replaces a branch built from more specific columns
fn put_leaf(branch: &mut Branch, field: String, value: Value) {
    match branch.entries.get(&field) {
        Some(Slot::Branch(_)) => {}
        _ => {
            branch.entries.insert(field, Slot::Leaf(value));
        }
    }
}

fn into_object(entries: IndexMap<String, Slot>) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(field, slot)| {
            let value = match slot {
                Slot::Leaf(value) => value,
                Slot::Branch(branch) => into_relation(branch),
            };
            (field, value)
        })
        .collect()
}

/// A related record whose identifier is null was not joined
fn into_relation(branch: Branch) -> Value {
    if is_absent(&branch) {
        return Value::Null;
    }
    Value::Object(into_object(branch.entries))
}

fn is_absent(branch: &Branch) -> bool {
    let identifiers: Vec<&Slot> = branch
        .schema
        .as_deref()
        .map(|schema| {
            schema
                .identifiers
                .iter()
                .filter_map(|id| branch.entries.get(id))
                .collect()
        })
        .unwrap_or_default();

    if identifiers.is_empty() {
        return matches!(branch.entries.first(), Some((_, Slot::Leaf(Value::Null))));
    }
    identifiers
        .iter()
        .all(|slot| matches!(slot, Slot::Leaf(Value::Null)))
}

fn strip_prefix_ignore_case<'k>(key: &'k str, prefix: &str) -> Option<&'k str> {
    let head = key.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &key[prefix.len()..])
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
