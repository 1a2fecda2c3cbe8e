//! Sort command implementation

use super::output::{self, OutputFormat};
use super::session::Session;
use anyhow::Result;
use esql_filter::{Nulls, SortParser};
use serde_json::json;
use std::path::PathBuf;

/// Configuration for sort command
pub struct SortConfig {
    pub type_name: String,
    pub map_to: Option<String>,
    pub expression: String,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Translate one sort expression into an `ORDER BY` clause
pub fn sort(session: &Session, config: SortConfig) -> Result<()> {
    let ctx = session.root(&config.type_name, config.map_to.as_deref())?;
    let parser = SortParser::new(session.resolver());
    let items = parser.items(&config.expression, &ctx);
    if items.is_empty() {
        eprintln!(
            "{}",
            output::format_warning(&format!("nothing sortable in '{}'", config.expression))
        );
    }

    let content = match config.output_format {
        OutputFormat::Table => parser.order_by(&config.expression, &ctx),
        format => {
            let entries: Vec<_> = items
                .iter()
                .map(|item| {
                    json!({
                        "column": item.column,
                        "direction": item.direction.sql(),
                        "nulls": item.nulls.map(|nulls| match nulls {
                            Nulls::First => "first",
                            Nulls::Last => "last",
                        }),
                    })
                })
                .collect();
            let value = json!({
                "orderBy": parser.order_by(&config.expression, &ctx),
                "items": entries,
            });
            output::format_json(&value, format == OutputFormat::JsonPretty)?
        }
    };
    output::write_output(&content, config.output_file.as_deref())
}
