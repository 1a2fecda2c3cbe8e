//! Schema-to-SQL resolver
//!
//! Turns reflected type metadata into SQL fragments:
//! - `table`, `columns`, `column` for the select list and `FROM`
//! - `identifier`, `predicates`, `assignments`, `parameters` for `WHERE`,
//!   `UPDATE ... SET` and `INSERT ... VALUES`
//! - `join`/`join_child` for `ON` clauses
//! - `traverse`/`relation` for aliasing related types
//!
//! One resolver is one query-building session: schemas are cached and alias
//! nodes live for as long as the resolver does.

use crate::alias::{AliasNode, normalize};
use crate::context::Context;
use crate::denormalize::Denormalizer;
use crate::mapper::RowMapper;
use crate::selection::ColumnSelection;
use esql_diagnostics::{EsqlError, Result};
use esql_schema::{Association, SchemaReflector, SchemaType, short_name};
use esql_types::{Dialect, SqlValue, TypeCoercer};
use indexmap::IndexMap;
use log::{debug, trace};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

type RootKey = (String, Option<String>);

pub struct SchemaResolver {
    reflector: Arc<dyn SchemaReflector>,
    coercer: TypeCoercer,
    schemas: RwLock<IndexMap<String, Arc<SchemaType>>>,
    roots: RwLock<IndexMap<RootKey, Context>>,
}

impl SchemaResolver {
    pub fn new(reflector: Arc<dyn SchemaReflector>, dialect: Dialect) -> Self {
        Self {
            reflector,
            coercer: TypeCoercer::new(dialect),
            schemas: RwLock::new(IndexMap::new()),
            roots: RwLock::new(IndexMap::new()),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.coercer.dialect()
    }

    /// Cached metadata for a type
    pub fn schema(&self, type_name: &str) -> Result<Arc<SchemaType>> {
        self.try_schema(type_name)
            .ok_or_else(|| EsqlError::type_not_found(type_name))
    }

    /// Cached metadata for a type, `None` when the reflector does not know it
    pub fn try_schema(&self, type_name: &str) -> Option<Arc<SchemaType>> {
        if let Some(schema) = self.schemas.read().get(type_name) {
            return Some(Arc::clone(schema));
        }
        let reflected = Arc::new(self.reflector.reflect(type_name)?);
        debug!(
            "reflected {type_name}: table {}, {} fields, {} associations",
            reflected.qualified_table(),
            reflected.fields.len(),
            reflected.associations.len()
        );
        let mut schemas = self.schemas.write();
        Some(Arc::clone(
            schemas.entry(type_name.to_string()).or_insert(reflected),
        ))
    }

    /// Root context for a type
    pub fn resolve(&self, type_name: &str) -> Result<Context> {
        self.resolve_with(type_name, None)
    }

    /// Root context for a type whose rows are mapped to another output type
    pub fn resolve_as(&self, type_name: &str, map_to: &str) -> Result<Context> {
        self.resolve_with(type_name, Some(map_to))
    }

    fn resolve_with(&self, type_name: &str, map_to: Option<&str>) -> Result<Context> {
        let key = (type_name.to_string(), map_to.map(str::to_string));
        if let Some(ctx) = self.roots.read().get(&key) {
            return Ok(ctx.clone());
        }

        let schema = self.schema(type_name)?;
        let (effective, raw) = match map_to {
            Some(output) => (
                self.try_schema(output).unwrap_or_else(|| Arc::clone(&schema)),
                short_name(output).to_string(),
            ),
            None => (Arc::clone(&schema), schema.short_name().to_string()),
        };
        if normalize(&raw).is_empty() {
            return Err(EsqlError::schema(format!(
                "type '{type_name}' has no usable alias"
            )));
        }

        let node = AliasNode::root(schema.name.clone(), raw);
        debug!("resolved {type_name} as {}", node.full());
        let ctx = Context::new(schema, effective, node, map_to.map(str::to_string), None);
        Ok(self.roots.write().entry(key).or_insert(ctx).clone())
    }

    /// `<schema>.<table> <alias>` or `<table> <alias>`
    pub fn table(&self, ctx: &Context) -> String {
        format!("{} {}", ctx.schema().qualified_table(), ctx.alias())
    }

    pub fn alias<'c>(&self, ctx: &'c Context) -> &'c str {
        ctx.alias()
    }

    /// Select list, joined with `", "`
    pub fn columns(&self, ctx: &Context, selection: &ColumnSelection) -> String {
        self.column_list(ctx, selection).join(", ")
    }

    /// Select list, one entry per column
    pub fn column_list(&self, ctx: &Context, selection: &ColumnSelection) -> Vec<String> {
        let schema = ctx.schema();
        let alias = ctx.alias();
        let mut columns: Vec<String> = schema
            .fields
            .iter()
            .filter(|field| !selection.is_identifiers_only() || schema.is_identifier(&field.name))
            .filter(|field| selection.includes(&field.name))
            .map(|field| {
                if selection.with_aliases() {
                    format!("{alias}.{} AS {alias}_{}", field.column, field.name)
                } else {
                    format!("{alias}.{}", field.column)
                }
            })
            .collect();

        if selection.with_join_columns() {
            for association in schema
                .associations
                .iter()
                .filter(|a| a.kind.is_to_one() && a.is_owning_side())
                .filter(|a| selection.includes(&a.field))
            {
                columns.extend(self.join_columns(ctx, association, selection.with_aliases()));
            }
        }
        trace!("{} columns for {}", columns.len(), alias);
        columns
    }

    /// `alias.local AS targetAlias_referencedField` per join column
    fn join_columns(&self, ctx: &Context, association: &Association, aliased: bool) -> Vec<String> {
        let alias = ctx.alias();
        let target_alias = ctx.node().relation_alias(&association.field);
        let target = self.try_schema(&association.target);
        association
            .join_columns
            .iter()
            .map(|jc| {
                if !aliased {
                    return format!("{alias}.{}", jc.name);
                }
                let referenced = target
                    .as_ref()
                    .and_then(|t| t.field_by_column(&jc.referenced_column))
                    .map_or(jc.referenced_column.as_str(), |f| f.name.as_str());
                format!("{alias}.{} AS {target_alias}_{referenced}", jc.name)
            })
            .collect()
    }

    /// `alias.column` for a field, `None` for unknown fields
    pub fn column(&self, ctx: &Context, field: &str) -> Option<String> {
        ctx.schema()
            .field(field)
            .map(|mapping| format!("{}.{}", ctx.alias(), mapping.column))
    }

    /// `alias.id = :id` for every identifier field, joined with ` AND `
    pub fn identifier(&self, ctx: &Context) -> String {
        let alias = ctx.alias();
        ctx.schema()
            .identifier_fields()
            .map(|field| format!("{alias}.{} = :{}", field.column, field.name))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// `alias.column = :field` pairs joined with ` AND `
    pub fn predicates(&self, ctx: &Context, fields: Option<&[&str]>) -> String {
        self.bindings(ctx, fields).join(" AND ")
    }

    /// `alias.column = :field` pairs joined with `", "`, for `UPDATE ... SET`
    pub fn assignments(&self, ctx: &Context, fields: Option<&[&str]>) -> String {
        self.bindings(ctx, fields).join(", ")
    }

    fn bindings(&self, ctx: &Context, fields: Option<&[&str]>) -> Vec<String> {
        let alias = ctx.alias();
        ctx.schema()
            .fields
            .iter()
            .filter(|field| fields.is_none_or(|names| names.contains(&field.name.as_str())))
            .map(|field| format!("{alias}.{} = :{}", field.column, field.name))
            .collect()
    }

    /// `:a, :b` placeholder list
    pub fn parameters<S: AsRef<str>>(&self, names: &[S]) -> String {
        names
            .iter()
            .map(|name| format!(":{}", name.as_ref()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Coerce a value through the declared type of `field`
    pub fn to_sql_value(&self, ctx: &Context, field: &str, value: impl Into<SqlValue>) -> Result<SqlValue> {
        let mapping = ctx
            .schema()
            .field(field)
            .ok_or_else(|| EsqlError::unknown_column(field))?;
        self.coercer
            .coerce(&mapping.column_type, value.into())
            .map_err(|e| EsqlError::invalid_value(format!("{field}: {e}")).for_column(field))
    }

    /// Join predicate to `target_type`.
    ///
    /// Uses the association an unnamed traversal already claimed, else the
    /// first association targeting the type. A claimed association is joined
    /// through, never reported as `RelationNotFound`.
    pub fn join(&self, ctx: &Context, target_type: &str) -> Result<String> {
        let target = self.schema(target_type)?;
        let candidates = Self::candidates(ctx, target_type, &target);
        let association = candidates
            .iter()
            .copied()
            .find(|a| ctx.node().claimed(&a.field).is_some())
            .or_else(|| candidates.first().copied())
            .ok_or_else(|| EsqlError::relation_not_found(ctx.type_name(), target_type))?;
        let target_alias = ctx.node().relation_alias(&association.field);
        self.join_predicate(ctx, association, &target, &target_alias)
    }

    /// Join predicate through the exact association `child` was reached by
    pub fn join_child(&self, parent: &Context, child: &Context) -> Result<String> {
        let association = child
            .node()
            .relation()
            .filter(|_| child.node().parent() == Some(parent.alias()))
            .and_then(|field| parent.effective_schema().association(field))
            .ok_or_else(|| EsqlError::relation_not_found(parent.type_name(), child.type_name()))?;
        self.join_predicate(parent, association, child.schema(), child.alias())
    }

    fn join_predicate(
        &self,
        ctx: &Context,
        association: &Association,
        target: &SchemaType,
        target_alias: &str,
    ) -> Result<String> {
        let alias = ctx.alias();
        let pairs: Vec<String> = if association.is_owning_side() {
            association
                .join_columns
                .iter()
                .map(|jc| format!("{target_alias}.{} = {alias}.{}", jc.referenced_column, jc.name))
                .collect()
        } else {
            let owning = association
                .mapped_by
                .as_deref()
                .and_then(|field| target.association(field))
                .filter(|owning| owning.is_owning_side())
                .ok_or_else(|| EsqlError::relation_not_found(ctx.type_name(), &target.name))?;
            owning
                .join_columns
                .iter()
                .map(|jc| format!("{target_alias}.{} = {alias}.{}", jc.name, jc.referenced_column))
                .collect()
        };
        Ok(pairs.join(" AND "))
    }

    /// Traverse from `ctx` to `target_type`, allocating a child alias.
    ///
    /// Without an explicit alias each call claims the next association to the
    /// target type; once all are claimed the traversal fails with
    /// `AliasExhausted`. An explicit alias is always accepted and reused.
    pub fn traverse(&self, ctx: &Context, target_type: &str, alias: Option<&str>) -> Result<Context> {
        let target = self.schema(target_type)?;
        let candidates: Vec<&str> = Self::candidates(ctx, target_type, &target)
            .iter()
            .map(|a| a.field.as_str())
            .collect();

        let node = match alias {
            Some(alias) => {
                if normalize(alias).is_empty() {
                    return Err(EsqlError::invalid_value(format!(
                        "alias '{alias}' has no alphanumeric characters"
                    )));
                }
                let relation = candidates
                    .iter()
                    .copied()
                    .find(|field| ctx.node().claimed(field).is_none())
                    .or_else(|| candidates.first().copied());
                ctx.node().claim_named(alias, &target.name, relation)
            }
            None if candidates.is_empty() => {
                return Err(EsqlError::relation_not_found(ctx.type_name(), target_type));
            }
            None => ctx
                .node()
                .claim_relation(&candidates, &target.name)
                .ok_or_else(|| EsqlError::alias_exhausted(ctx.type_name(), target_type))?,
        };

        debug!("traversed {} -> {} as {}", ctx.alias(), target.name, node.full());
        Ok(self.child_context(ctx, target, node))
    }

    /// Context for the association `field`, reusing its alias when already claimed
    pub fn relation(&self, ctx: &Context, field: &str) -> Result<Context> {
        let association = ctx
            .effective_schema()
            .association(field)
            .ok_or_else(|| EsqlError::relation_not_found(ctx.type_name(), field))?;
        let target = self.schema(&association.target)?;
        let node = ctx
            .node()
            .claimed(field)
            .or_else(|| ctx.node().claim_relation(&[field], &target.name))
            .or_else(|| ctx.node().claimed(field))
            .ok_or_else(|| EsqlError::internal(format!("relation {field} could not be claimed")))?;
        Ok(self.child_context(ctx, target, node))
    }

    fn child_context(&self, parent: &Context, target: Arc<SchemaType>, node: Arc<AliasNode>) -> Context {
        Context::new(
            Arc::clone(&target),
            target,
            node,
            None,
            Some(Arc::new(parent.clone())),
        )
    }

    fn candidates<'c>(ctx: &'c Context, target_type: &str, target: &SchemaType) -> Vec<&'c Association> {
        ctx.effective_schema()
            .associations
            .iter()
            .filter(|a| a.target == target_type || a.target == target.name)
            .collect()
    }

    /// Rebuild nested values from flat aliased rows
    pub fn map(&self, ctx: &Context, rows: &Value) -> Result<Value> {
        RowMapper::new(self).map(ctx, rows)
    }

    /// Map rows, then materialize them through a denormalizer
    pub fn map_into<T, D>(&self, ctx: &Context, rows: &Value, denormalizer: &D) -> Result<T>
    where
        D: Denormalizer<T> + ?Sized,
    {
        let value = self.map(ctx, rows)?;
        denormalizer.denormalize(value, ctx.output_type())
    }
}

impl std::fmt::Debug for SchemaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaResolver")
            .field("dialect", &self.dialect())
            .field("schemas", &self.schemas.read().keys().collect::<Vec<_>>())
            .finish()
    }
}
