//! Composed `SELECT` statements
//!
//! [`SelectBuilder`] strings the resolver fragments together: the root table,
//! `LEFT JOIN`s for requested relation paths, the column list of every joined
//! context, an optional filter and an optional sort.

use esql_diagnostics::{EsqlError, Result};
use esql_filter::{FilterParser, SortParser};
use esql_resolver::{ColumnSelection, Context, SchemaResolver};
use esql_types::SqlValue;
use indexmap::{IndexMap, IndexSet};
use log::debug;
use serde::Serialize;
use std::iter;

/// A statement and the values bound to its placeholders
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectQuery {
    pub sql: String,
    pub parameters: IndexMap<String, SqlValue>,
}

struct Join {
    parent: Context,
    child: Context,
}

pub struct SelectBuilder<'r> {
    resolver: &'r SchemaResolver,
    root: Context,
    joins: Vec<Join>,
    selection: ColumnSelection,
    filter: Option<String>,
    sort: Option<String>,
}

impl<'r> SelectBuilder<'r> {
    pub fn new(resolver: &'r SchemaResolver, root: Context) -> Self {
        Self {
            resolver,
            root,
            joins: Vec::new(),
            selection: ColumnSelection::all(),
            filter: None,
            sort: None,
        }
    }

    /// Column selection applied to the root and every joined context
    pub fn selection(mut self, selection: ColumnSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Join a relation path such as `model` or `model.cars`.
    ///
    /// Each segment names an association of the previous one. Segments
    /// already joined are reused.
    pub fn join(mut self, path: &str) -> Result<Self> {
        let mut parent = self.root.clone();
        for field in path.split('.').map(str::trim) {
            if field.is_empty() {
                return Err(EsqlError::invalid_value(format!(
                    "empty segment in relation path '{path}'"
                )));
            }
            let child = self.resolver.relation(&parent, field)?;
            if !self.joins.iter().any(|j| j.child.alias() == child.alias()) {
                self.joins.push(Join {
                    parent: parent.clone(),
                    child: child.clone(),
                });
            }
            parent = child;
        }
        Ok(self)
    }

    /// Filter expression applied to the root context
    pub fn filter(mut self, text: impl Into<String>) -> Self {
        self.filter = Some(text.into());
        self
    }

    /// Sort expression applied to the root context
    pub fn sort(mut self, text: impl Into<String>) -> Self {
        self.sort = Some(text.into());
        self
    }

    pub fn root(&self) -> &Context {
        &self.root
    }

    /// The root followed by every joined context, in join order
    pub fn contexts(&self) -> impl Iterator<Item = &Context> {
        iter::once(&self.root).chain(self.joins.iter().map(|j| &j.child))
    }

    pub fn build(&self) -> Result<SelectQuery> {
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.column_list().join(", "),
            self.resolver.table(&self.root)
        );
        for join in &self.joins {
            let on = self.resolver.join_child(&join.parent, &join.child)?;
            sql.push_str(&format!(" LEFT JOIN {} ON {on}", self.resolver.table(&join.child)));
        }

        let mut parameters = IndexMap::new();
        if let Some(text) = self.filter.as_deref().filter(|t| !t.trim().is_empty()) {
            let parsed = FilterParser::new(self.resolver).parse(text, &self.root)?;
            sql.push(' ');
            sql.push_str(&parsed.where_clause());
            parameters = parsed.parameters;
        }
        if let Some(text) = &self.sort {
            let order_by = SortParser::new(self.resolver).order_by(text, &self.root);
            if !order_by.is_empty() {
                sql.push(' ');
                sql.push_str(&order_by);
            }
        }

        debug!("select on {}: {sql}", self.root.alias());
        Ok(SelectQuery { sql, parameters })
    }

    /// Columns of every context; a join column and the joined identifier
    /// share an output name, and only the first is kept.
    fn column_list(&self) -> Vec<String> {
        let mut seen = IndexSet::new();
        self.contexts()
            .flat_map(|ctx| self.resolver.column_list(ctx, &self.selection))
            .filter(|column| {
                let output = column.rsplit(" AS ").next().unwrap_or(column.as_str());
                seen.insert(output.to_string())
            })
            .collect()
    }
}
