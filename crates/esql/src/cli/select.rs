//! Select command implementation

use super::output::{self, OutputFormat};
use super::session::Session;
use crate::query::SelectBuilder;
use anyhow::Result;
use esql_resolver::ColumnSelection;
use std::path::PathBuf;

/// Configuration for select command
pub struct SelectConfig {
    pub type_name: String,
    pub map_to: Option<String>,
    pub relations: Vec<String>,
    pub fields: Vec<String>,
    pub identifiers_only: bool,
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

impl SelectConfig {
    fn selection(&self) -> ColumnSelection {
        let selection = if self.fields.is_empty() {
            ColumnSelection::all()
        } else {
            ColumnSelection::fields(self.fields.iter().cloned())
        };
        if self.identifiers_only {
            selection.identifiers_only()
        } else {
            selection
        }
    }
}

/// Print a complete `SELECT` for the configured type
pub fn select(session: &Session, config: SelectConfig) -> Result<()> {
    let root = session.root(&config.type_name, config.map_to.as_deref())?;
    let mut builder = SelectBuilder::new(session.resolver(), root).selection(config.selection());
    for path in &config.relations {
        builder = builder.join(path)?;
    }
    if let Some(filter) = &config.filter {
        builder = builder.filter(filter.as_str());
    }
    if let Some(sort) = &config.sort {
        builder = builder.sort(sort.as_str());
    }

    let query = match (builder.build(), &config.filter) {
        (Ok(query), _) => query,
        (Err(err), Some(filter)) => return Err(output::diagnose(err, filter)),
        (Err(err), None) => return Err(err.into()),
    };
    let content = output::format_statement(&query.sql, &query.parameters, config.output_format)?;
    output::write_output(&content, config.output_file.as_deref())
}
