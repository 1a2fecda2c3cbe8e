//! Output formatting utilities

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use esql_diagnostics::EsqlError;
use esql_types::SqlValue;
use indexmap::IndexMap;
use serde_json::Value;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    JsonPretty,
    Table,
}

impl OutputFormat {
    /// Unknown names fall back to pretty JSON
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "table" => Self::Table,
            _ => Self::JsonPretty,
        }
    }
}

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(io::stdout().is_terminal()),
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Attach the source excerpt to errors that point into `source`
pub fn diagnose(error: EsqlError, source: &str) -> anyhow::Error {
    if error.span().is_some() {
        anyhow!(error.to_diagnostic(source).render(source))
    } else {
        anyhow::Error::new(error)
    }
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format JSON value for output
pub fn format_json(value: &Value, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to serialize JSON")
    } else {
        serde_json::to_string(value).context("Failed to serialize JSON")
    }
}

/// Rows as a table with one column per key, or `None` when `value` is not
/// tabular.
pub fn format_as_table(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                return Some("(no rows)".to_string());
            }
            let mut keys: Vec<&String> = Vec::new();
            for item in items {
                let Value::Object(row) = item else {
                    return None;
                };
                for key in row.keys() {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }

            let mut builder = Builder::default();
            builder.push_record(keys.iter().map(|k| k.to_string()));
            for item in items {
                builder.push_record(
                    keys.iter()
                        .map(|k| item.get(k.as_str()).map_or_else(String::new, format_value)),
                );
            }
            Some(builder.build().with(Style::modern()).to_string())
        }
        Value::Object(obj) => {
            #[derive(Tabled)]
            struct KeyValue {
                #[tabled(rename = "Key")]
                key: String,
                #[tabled(rename = "Value")]
                value: String,
            }

            let rows = obj.iter().map(|(k, v)| KeyValue {
                key: k.clone(),
                value: format_value(v),
            });
            Some(Table::new(rows).with(Style::modern()).to_string())
        }
        _ => None,
    }
}

/// A statement followed by its bound parameters
pub fn format_statement(
    sql: &str,
    parameters: &IndexMap<String, SqlValue>,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct Parameter {
                #[tabled(rename = "Placeholder")]
                name: String,
                #[tabled(rename = "Value")]
                value: String,
            }

            if parameters.is_empty() {
                return Ok(sql.to_string());
            }
            let rows = parameters.iter().map(|(name, value)| Parameter {
                name: format!(":{name}"),
                value: value.to_string(),
            });
            Ok(format!("{sql}\n\n{}", Table::new(rows).with(Style::modern())))
        }
        json => {
            let value = serde_json::json!({ "sql": sql, "parameters": parameters });
            format_json(&value, json == OutputFormat::JsonPretty)
        }
    }
}

/// Format a simple value for display
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => serde_json::to_string(obj).unwrap_or_else(|_| format!("{{{} fields}}", obj.len())),
    }
}

/// Print output in the specified format
pub fn print_output(value: &Value, format: OutputFormat, output_file: Option<&Path>) -> Result<()> {
    let content = match format {
        OutputFormat::Json => format_json(value, false)?,
        OutputFormat::JsonPretty => format_json(value, true)?,
        OutputFormat::Table => match format_as_table(value) {
            Some(table) => table,
            None => format_json(value, true)?,
        },
    };

    write_output(&content, output_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("json", OutputFormat::Json)]
    #[case("TABLE", OutputFormat::Table)]
    #[case("pretty", OutputFormat::JsonPretty)]
    #[case("yaml", OutputFormat::JsonPretty)]
    fn test_output_format_names(#[case] name: &str, #[case] expected: OutputFormat) {
        assert_eq!(OutputFormat::parse(name), expected);
    }

    #[test]
    fn test_rows_table_has_one_column_per_key() {
        let table = format_as_table(&json!([
            {"id": 1, "name": "Caddy"},
            {"id": 2, "model": {"id": 1}}
        ]))
        .unwrap();

        let header = table.lines().nth(1).unwrap();
        assert!(header.contains("id") && header.contains("name") && header.contains("model"));
        assert!(table.contains(r#"{"id":1}"#));
    }

    #[test]
    fn test_scalars_are_not_tabular() {
        assert_eq!(format_as_table(&json!("text")), None);
        assert_eq!(format_as_table(&json!([1, 2])), None);
    }

    #[test]
    fn test_statement_json() {
        let mut parameters = IndexMap::new();
        parameters.insert("price_1".to_string(), SqlValue::Integer(100));

        let text = format_statement("car.price > :price_1", &parameters, OutputFormat::Json).unwrap();
        assert_eq!(text, r#"{"sql":"car.price > :price_1","parameters":{"price_1":100}}"#);
    }

    #[test]
    fn test_diagnose_renders_excerpt() {
        let source = "and(price.between.1)";
        let err = esql_filter::parse_filter(source).unwrap_err();
        let rendered = diagnose(err, source).to_string();

        assert!(rendered.contains("ESQL0005"));
        assert!(rendered.contains("^^^^^^^"));
    }
}
