//! Filter expressions for ESQL
//!
//! Parses the nested PostgREST-style filter grammar into a parameterized SQL
//! predicate:
//!
//! ```text
//! and(price.gt.1000,sold.is.false,or(name.not.eq.caddy,sold.is.true))
//! ```
//!
//! Parsing is two-phase. The text is tokenized and built into a [`Group`]
//! tree, then rendered against a resolver [`Context`](esql_resolver::Context),
//! which resolves columns and coerces bound values.

mod ast;
mod builder;
mod capabilities;
mod lexer;
mod render;
mod sort;

pub use ast::{Comparison, Condition, Connective, Group, Literal, Node, Operand, Operator, Value};
pub use builder::{MAX_DEPTH, parse_filter};
pub use capabilities::{DefaultCapabilities, DialectCapabilities};
pub use lexer::{Token, TokenKind, tokenize};
pub use render::ParsedFilter;
pub use sort::{Direction, Nulls, SortItem, SortParser};

use esql_diagnostics::Result;
use esql_resolver::{Context, SchemaResolver};
use log::debug;
use render::Renderer;
use std::sync::Arc;

/// Translates filter text into SQL for one resolver session
pub struct FilterParser<'r> {
    resolver: &'r SchemaResolver,
    capabilities: Arc<dyn DialectCapabilities>,
}

impl<'r> FilterParser<'r> {
    pub fn new(resolver: &'r SchemaResolver) -> Self {
        Self {
            resolver,
            capabilities: Arc::new(DefaultCapabilities),
        }
    }

    /// Replace the operator support predicate
    pub fn with_capabilities(mut self, capabilities: Arc<dyn DialectCapabilities>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Parse and render `text` against the columns of `ctx`
    pub fn parse(&self, text: &str, ctx: &Context) -> Result<ParsedFilter> {
        let group = parse_filter(text)?;
        let parsed = Renderer::new(self.resolver, ctx, self.capabilities.as_ref()).render(&group)?;
        debug!(
            "filter {text} on {}: {} ({} parameters)",
            ctx.alias(),
            parsed.sql,
            parsed.parameters.len()
        );
        Ok(parsed)
    }
}
