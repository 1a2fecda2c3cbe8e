//! Filter command implementation

use super::output::{self, OutputFormat};
use super::session::Session;
use anyhow::Result;
use esql_filter::FilterParser;
use std::path::PathBuf;

/// Configuration for filter command
pub struct FilterConfig {
    pub type_name: String,
    pub map_to: Option<String>,
    pub expression: String,
    /// Relation path the expression applies to instead of the root
    pub relation: Option<String>,
    /// Print `WHERE ...` instead of the bare predicate
    pub where_clause: bool,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Translate one filter expression
pub fn filter(session: &Session, config: FilterConfig) -> Result<()> {
    let resolver = session.resolver();
    let mut ctx = session.root(&config.type_name, config.map_to.as_deref())?;
    if let Some(path) = &config.relation {
        for field in path.split('.') {
            ctx = resolver.relation(&ctx, field.trim())?;
        }
    }

    let parsed = FilterParser::new(resolver)
        .parse(&config.expression, &ctx)
        .map_err(|err| output::diagnose(err, &config.expression))?;
    let sql = if config.where_clause {
        parsed.where_clause()
    } else {
        parsed.sql
    };

    let content = output::format_statement(&sql, &parsed.parameters, config.output_format)?;
    output::write_output(&content, config.output_file.as_deref())
}
