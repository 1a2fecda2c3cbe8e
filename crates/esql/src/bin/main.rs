//! ESQL command-line interface

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use esql::cli::output::{self, OutputFormat};
use esql::cli::session::Session;
use esql::cli::{filter, map, repl, select, sort};
use esql::Dialect;
use log::LevelFilter;
use std::path::PathBuf;

/// ESQL command-line tool
#[derive(Parser)]
#[command(name = "esql")]
#[command(author, version, about = "SQL fragments, filters and row mapping from ORM mappings", long_about = None)]
struct Cli {
    /// Mapping file (.json or .xml); defaults to $ESQL_SCHEMA
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    /// Target dialect (postgres, mysql, sqlite, generic)
    #[arg(short, long, default_value = "postgres", global = true)]
    dialect: String,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format (json, pretty, table)
    #[arg(short = 'f', long, global = true)]
    format: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a complete SELECT statement
    Select {
        /// Mapped type to select from
        type_name: String,

        /// Present rows as this type instead
        #[arg(long = "as")]
        map_to: Option<String>,

        /// Relation paths to join (e.g. model, model.manufacturer)
        #[arg(short = 'j', long = "join")]
        relations: Vec<String>,

        /// Restrict the column list to these fields
        #[arg(long = "field", value_delimiter = ',')]
        fields: Vec<String>,

        /// Select identifier columns only
        #[arg(long)]
        ids_only: bool,

        /// Filter expression (e.g. and(price.gt.100))
        #[arg(short = 'w', long = "where")]
        filter: Option<String>,

        /// Sort expression (e.g. name.desc,price.nullslast)
        #[arg(long = "order")]
        sort: Option<String>,
    },

    /// Translate a filter expression
    Filter {
        /// Mapped type the filter applies to
        type_name: String,

        /// Filter expression
        expression: String,

        /// Present rows as this type instead
        #[arg(long = "as")]
        map_to: Option<String>,

        /// Apply the filter to a relation path of the type
        #[arg(short, long)]
        relation: Option<String>,

        /// Prefix the predicate with WHERE
        #[arg(long = "where")]
        where_clause: bool,
    },

    /// Translate a sort expression
    Sort {
        /// Mapped type the sort applies to
        type_name: String,

        /// Sort expression
        expression: String,

        /// Present rows as this type instead
        #[arg(long = "as")]
        map_to: Option<String>,
    },

    /// Fold flat aliased rows into nested values
    Map {
        /// Mapped type of the root rows
        type_name: String,

        /// JSON rows (default: stdin)
        rows: Option<PathBuf>,

        /// Present rows as this type instead
        #[arg(long = "as")]
        map_to: Option<String>,

        /// Relation paths joined by the query that produced the rows
        #[arg(short = 'j', long = "join")]
        relations: Vec<String>,
    },

    /// Start interactive REPL
    Repl {
        /// Type to start on
        type_name: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    let level = match verbose {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    };
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.init();
}

fn run(cli: Cli) -> Result<()> {
    let dialect: Dialect = cli.dialect.parse()?;
    let session = Session::open(cli.schema.as_deref(), dialect)?;
    let output_format = OutputFormat::parse(cli.format.as_deref().unwrap_or("pretty"));
    let output_file = cli.output;

    match cli.command {
        Commands::Select {
            type_name,
            map_to,
            relations,
            fields,
            ids_only,
            filter,
            sort,
        } => {
            let config = select::SelectConfig {
                type_name,
                map_to,
                relations,
                fields,
                identifiers_only: ids_only,
                filter,
                sort,
                output_format,
                output_file,
            };
            select::select(&session, config)
        }

        Commands::Filter {
            type_name,
            expression,
            map_to,
            relation,
            where_clause,
        } => {
            let config = filter::FilterConfig {
                type_name,
                map_to,
                expression,
                relation,
                where_clause,
                output_format,
                output_file,
            };
            filter::filter(&session, config)
        }

        Commands::Sort {
            type_name,
            expression,
            map_to,
        } => {
            let config = sort::SortConfig {
                type_name,
                map_to,
                expression,
                output_format,
                output_file,
            };
            sort::sort(&session, config)
        }

        Commands::Map {
            type_name,
            rows,
            map_to,
            relations,
        } => {
            let config = map::MapConfig {
                type_name,
                map_to,
                rows,
                relations,
                output_format,
                output_file,
            };
            map::map(&session, config)
        }

        Commands::Repl { type_name } => repl::run(&session, repl::ReplConfig { type_name }),
    }
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
