//! REPL implementation

use super::output;
use super::session::Session;
use crate::query::SelectBuilder;
use anyhow::{Result, bail};
use colored::Colorize;
use esql_filter::{FilterParser, SortParser};
use esql_resolver::{ColumnSelection, Context};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;

/// Configuration for REPL
pub struct ReplConfig {
    /// Type to start on
    pub type_name: Option<String>,
}

/// REPL state
struct ReplState<'s> {
    session: &'s Session,
    /// Current root context
    current: Option<Context>,
}

impl<'s> ReplState<'s> {
    fn current(&self) -> Result<&Context> {
        match &self.current {
            Some(ctx) => Ok(ctx),
            None => bail!("No type selected. Use :use <Type>"),
        }
    }

    fn prompt(&self) -> String {
        match &self.current {
            Some(ctx) => format!("esql({})> ", ctx.alias()),
            None => "esql> ".to_string(),
        }
    }
}

/// Run the interactive REPL
pub fn run(session: &Session, config: ReplConfig) -> Result<()> {
    println!("{}", "ESQL Interactive REPL".cyan().bold());
    println!("Type {} for help, {} to quit", ":help".green(), ":quit".green());
    println!(
        "Mapping: {} ({})",
        session.schema_path().display(),
        session.resolver().dialect()
    );
    println!();

    let mut state = ReplState {
        session,
        current: None,
    };
    if let Some(type_name) = &config.type_name {
        state.current = Some(session.root(type_name, None)?);
    }

    let mut rl = DefaultEditor::new()?;
    let history_file = dirs::home_dir().map(|mut path| {
        path.push(".esql_history");
        path
    });
    if let Some(path) = &history_file {
        let _ = rl.load_history(path);
    }

    loop {
        match rl.readline(&state.prompt()) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                let result = if line.starts_with(':') {
                    match handle_command(line, &mut state) {
                        Ok(false) => break,
                        Ok(true) => Ok(()),
                        Err(e) => Err(e),
                    }
                } else {
                    handle_filter(line, &state)
                };
                if let Err(e) = result {
                    eprintln!("{}", output::format_error(&e));
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err:?}");
                break;
            }
        }
    }

    if let Some(path) = &history_file {
        let _ = rl.save_history(path);
    }

    println!("Goodbye!");
    Ok(())
}

/// Handle REPL commands (starting with :); `Ok(false)` ends the session
fn handle_command(command: &str, state: &mut ReplState<'_>) -> Result<bool> {
    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, rest)| (name, rest.trim()));

    match name {
        ":help" | ":h" => print_help(),
        ":quit" | ":q" | ":exit" => return Ok(false),
        ":types" | ":ls" => {
            for type_name in state.session.type_names() {
                println!("  {}", type_name.cyan());
            }
        }
        ":use" | ":u" => {
            if rest.is_empty() {
                bail!("Usage: :use <Type> [as <MapTo>]");
            }
            let (type_name, map_to) = match rest.split_once(" as ") {
                Some((type_name, map_to)) => (type_name.trim(), Some(map_to.trim())),
                None => (rest, None),
            };
            let ctx = state.session.root(type_name, map_to)?;
            println!(
                "{}",
                output::format_success(&format!("{} as {}", ctx.type_name(), ctx.alias()))
            );
            state.current = Some(ctx);
        }
        ":columns" | ":c" => {
            let ctx = state.current()?;
            for column in state.session.resolver().column_list(ctx, &ColumnSelection::all()) {
                println!("  {column}");
            }
        }
        ":join" | ":j" => {
            if rest.is_empty() {
                bail!("Usage: :join <relation>");
            }
            let resolver = state.session.resolver();
            let ctx = state.current()?;
            let child = resolver.relation(ctx, rest)?;
            println!(
                "LEFT JOIN {} ON {}",
                resolver.table(&child),
                resolver.join_child(ctx, &child)?
            );
        }
        ":sort" | ":s" => {
            let ctx = state.current()?;
            let order_by = SortParser::new(state.session.resolver()).order_by(rest, ctx);
            if order_by.is_empty() {
                println!("{}", output::format_warning("nothing sortable"));
            } else {
                println!("{}", order_by.green());
            }
        }
        ":select" => {
            let ctx = state.current()?.clone();
            let mut builder = SelectBuilder::new(state.session.resolver(), ctx);
            if !rest.is_empty() {
                builder = builder.filter(rest);
            }
            let query = builder.build().map_err(|err| output::diagnose(err, rest))?;
            print_statement(&query.sql, &query.parameters)?;
        }
        other => bail!("Unknown command: {other}. Type :help for help"),
    }
    Ok(true)
}

/// Translate a filter expression against the current type
fn handle_filter(line: &str, state: &ReplState<'_>) -> Result<()> {
    let ctx = state.current()?;
    let parsed = FilterParser::new(state.session.resolver())
        .parse(line, ctx)
        .map_err(|err| output::diagnose(err, line))?;
    print_statement(&parsed.sql, &parsed.parameters)
}

fn print_statement(
    sql: &str,
    parameters: &indexmap::IndexMap<String, esql_types::SqlValue>,
) -> Result<()> {
    let text = output::format_statement(sql, parameters, output::OutputFormat::Table)?;
    println!("{}", text.green());
    Ok(())
}

/// Print help message
fn print_help() {
    println!("{}", "ESQL REPL Commands:".bold());
    println!();
    println!("  {}  Show this help message", ":help, :h".green());
    println!("  {}  Quit the REPL", ":quit, :q, :exit".green());
    println!("  {}  List mapped types", ":types, :ls".green());
    println!("  {}  Select the root type", ":use <Type> [as <MapTo>]".green());
    println!("  {}  Show the aliased column list", ":columns, :c".green());
    println!("  {}  Show the join for a relation", ":join <relation>, :j".green());
    println!("  {}  Translate a sort expression", ":sort <expr>, :s".green());
    println!("  {}  Build a full SELECT", ":select [filter]".green());
    println!();
    println!("{}", "Filters:".bold());
    println!();
    println!("  Any other line is translated as a filter on the current type.");
    println!();
    println!("{}", "Examples:".bold());
    println!();
    println!("  {}", ":use Car".cyan());
    println!("  {}", "and(price.gt.1000,or(name.like.*golf*,sold.is.false))".cyan());
    println!("  {}", ":sort name.desc,price.nullslast".cyan());
}

// Helper to get home directory
mod dirs {
    use super::PathBuf;

    pub(super) fn home_dir() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
    }
}
