//! Dialect operator support

use crate::ast::Comparison;
use esql_types::Dialect;

/// Decides whether a dialect can execute a comparison.
///
/// Closures `Fn(Comparison, Dialect) -> bool` implement it too.
pub trait DialectCapabilities: Send + Sync {
    fn supports(&self, comparison: Comparison, dialect: Dialect) -> bool;
}

/// SQLite has neither `ILIKE` nor `IS TRUE`, MySQL has no `ILIKE`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCapabilities;

impl DialectCapabilities for DefaultCapabilities {
    fn supports(&self, comparison: Comparison, dialect: Dialect) -> bool {
        !matches!(
            (dialect, comparison),
            (Dialect::Sqlite, Comparison::ILike | Comparison::Is) | (Dialect::MySql, Comparison::ILike)
        )
    }
}

impl<F> DialectCapabilities for F
where
    F: Fn(Comparison, Dialect) -> bool + Send + Sync,
{
    fn supports(&self, comparison: Comparison, dialect: Dialect) -> bool {
        self(comparison, dialect)
    }
}
