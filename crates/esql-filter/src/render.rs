//! SQL rendering of a filter tree
//!
//! Runs after the tree is built: resolves columns through the resolver,
//! checks dialect support, allocates placeholders and coerces values.

use crate::ast::{Comparison, Condition, Group, Literal, Node, Operand, Value};
use crate::capabilities::DialectCapabilities;
use esql_diagnostics::{ESQL0103, EsqlError, Result};
use esql_resolver::{Context, SchemaResolver};
use esql_types::SqlValue;
use indexmap::IndexMap;
use log::trace;
use serde::Serialize;
use std::collections::HashMap;

/// Rendered predicate and the values bound to its placeholders
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedFilter {
    pub sql: String,
    pub parameters: IndexMap<String, SqlValue>,
}

impl ParsedFilter {
    /// `sql` prefixed with `WHERE `, or nothing for an empty filter
    pub fn where_clause(&self) -> String {
        if self.sql.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.sql)
        }
    }
}

pub(crate) struct Renderer<'r> {
    resolver: &'r SchemaResolver,
    ctx: &'r Context,
    capabilities: &'r dyn DialectCapabilities,
    counters: HashMap<String, usize>,
    parameters: IndexMap<String, SqlValue>,
}

impl<'r> Renderer<'r> {
    pub(crate) fn new(
        resolver: &'r SchemaResolver,
        ctx: &'r Context,
        capabilities: &'r dyn DialectCapabilities,
    ) -> Self {
        Self {
            resolver,
            ctx,
            capabilities,
            counters: HashMap::new(),
            parameters: IndexMap::new(),
        }
    }

    pub(crate) fn render(mut self, group: &Group) -> Result<ParsedFilter> {
        let sql = self.group(group)?;
        Ok(ParsedFilter {
            sql,
            parameters: self.parameters,
        })
    }

    fn group(&mut self, group: &Group) -> Result<String> {
        let parts = group
            .children
            .iter()
            .map(|child| match child {
                Node::Group(nested) => self.group(nested).map(|sql| format!("({sql})")),
                Node::Condition(condition) => self.condition(condition),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(group.connective.sql()))
    }

    fn condition(&mut self, condition: &Condition) -> Result<String> {
        let column = self
            .resolver
            .column(self.ctx, &condition.column)
            .ok_or_else(|| EsqlError::unknown_column(&condition.column).with_span(condition.column_span))?;

        let comparison = condition.operator.comparison;
        let dialect = self.resolver.dialect();
        if !self.capabilities.supports(comparison, dialect) {
            return Err(
                EsqlError::unsupported_operator(condition.operator.sql(), dialect)
                    .with_span(condition.operator_span),
            );
        }

        let op = condition.operator.sql();
        let sql = match (&condition.operand, comparison) {
            (Operand::List(values), _) => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|value| {
                        let name = self.placeholder(&condition.column);
                        self.parameters.insert(name.clone(), uncoerced(&value.literal));
                        format!(":{name}")
                    })
                    .collect();
                format!("{column} {op} ({})", placeholders.join(","))
            }
            (Operand::Single(value), Comparison::Is) => {
                let keyword = match value.literal {
                    Literal::Bool(true) => "TRUE",
                    Literal::Bool(false) => "FALSE",
                    Literal::Null => "NULL",
                    Literal::Text(_) => {
                        return Err(EsqlError::invalid_value("'is' only accepts true, false or null")
                            .with_code(ESQL0103)
                            .for_column(&condition.column)
                            .with_span(value.span));
                    }
                };
                format!("{column} {op} {keyword}")
            }
            (Operand::Single(value), _) => {
                let bound = self.coerce(condition, value)?;
                let name = self.placeholder(&condition.column);
                self.parameters.insert(name.clone(), bound);
                format!("{column} {op} :{name}")
            }
        };
        trace!("{} -> {sql}", condition);
        Ok(sql)
    }

    fn coerce(&self, condition: &Condition, value: &Value) -> Result<SqlValue> {
        let raw = match &value.literal {
            Literal::Text(text) if condition.operator.comparison.is_pattern() => {
                SqlValue::Text(text.replace('*', "%"))
            }
            literal => uncoerced(literal),
        };
        self.resolver
            .to_sql_value(self.ctx, &condition.column, raw)
            .map_err(|e| e.with_span(value.span))
    }

    /// `<column>_<n>`, counted per column within one parse
    fn placeholder(&mut self, column: &str) -> String {
        let counter = self.counters.entry(column.to_string()).or_insert(0);
        *counter += 1;
        format!("{column}_{counter}")
    }
}

fn uncoerced(literal: &Literal) -> SqlValue {
    match literal {
        Literal::Text(text) => SqlValue::Text(text.clone()),
        Literal::Bool(b) => SqlValue::Bool(*b),
        Literal::Null => SqlValue::Null,
    }
}
