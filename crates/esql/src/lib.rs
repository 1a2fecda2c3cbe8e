//! ESQL: SQL fragments from mapped types
//!
//! This crate ties the workspace together:
//! - resolving mapped types into tables, aliases, columns and joins
//! - translating PostgREST-style filter and sort expressions
//! - folding flat aliased result rows back into nested values
//! - composing the above into complete `SELECT` statements
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use esql::{Dialect, SchemaRegistry, SchemaResolver, SelectBuilder};
//!
//! let registry = SchemaRegistry::from_json(r#"[
//!     {"name": "Car", "table": "car", "identifiers": ["id"],
//!      "fields": [{"name": "id", "type": "integer"}, {"name": "price", "type": "integer"}]}
//! ]"#)?;
//! let resolver = SchemaResolver::new(Arc::new(registry), Dialect::Postgres);
//! let car = resolver.resolve("Car")?;
//!
//! let query = SelectBuilder::new(&resolver, car)
//!     .filter("and(price.gt.100)")
//!     .sort("price.desc")
//!     .build()?;
//!
//! assert_eq!(
//!     query.sql,
//!     "SELECT car.id AS car_id, car.price AS car_price FROM car car WHERE car.price > :price_1 ORDER BY car.price desc"
//! );
//! # Ok::<(), esql::EsqlError>(())
//! ```

pub use esql_diagnostics as diagnostics;
pub use esql_filter as filter;
pub use esql_resolver as resolver;
pub use esql_schema as schema;
pub use esql_types as types;

pub use esql_diagnostics::{EsqlError, Result};
pub use esql_filter::{FilterParser, ParsedFilter, SortParser};
pub use esql_resolver::{ColumnSelection, Context, SchemaResolver};
pub use esql_schema::{SchemaReflector, SchemaRegistry};
pub use esql_types::{Dialect, SqlValue};

pub mod query;

pub use query::{SelectBuilder, SelectQuery};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
