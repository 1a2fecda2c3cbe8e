//! Map command implementation

use super::output::{self, OutputFormat};
use super::session::Session;
use anyhow::{Context, Result};
use log::debug;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Configuration for map command
pub struct MapConfig {
    pub type_name: String,
    pub map_to: Option<String>,
    /// JSON file with one row object or an array of rows; stdin when absent
    pub rows: Option<PathBuf>,
    /// Relation paths traversed before mapping, in query order
    pub relations: Vec<String>,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Fold flat aliased rows back into nested values
pub fn map(session: &Session, config: MapConfig) -> Result<()> {
    let resolver = session.resolver();
    let root = session.root(&config.type_name, config.map_to.as_deref())?;
    for path in &config.relations {
        let mut ctx = root.clone();
        for field in path.split('.') {
            ctx = resolver.relation(&ctx, field.trim())?;
        }
        debug!("claimed {} for {path}", ctx.alias());
    }

    let text = match &config.rows {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read rows: {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read rows from stdin")?;
            text
        }
    };
    let rows: Value = serde_json::from_str(&text).context("Rows are not valid JSON")?;

    let mapped = resolver.map(&root, &rows)?;
    output::print_output(&mapped, config.output_format, config.output_file.as_deref())
}
