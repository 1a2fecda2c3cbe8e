//! Schema reflection capability

use crate::schema::{Association, FieldMapping, SchemaType};
use esql_diagnostics::{ESQL0301, ESQL0302, ESQL0401, EsqlError};

/// Source of record type metadata.
///
/// Implementations must be deterministic: reflecting the same type twice
/// returns the same metadata. Callers cache the result per resolver.
pub trait SchemaReflector: Send + Sync {
    /// Metadata for `type_name`, or `None` when the type is not mapped
    fn reflect(&self, type_name: &str) -> Option<SchemaType>;

    fn table_name(&self, type_name: &str) -> Option<String> {
        self.reflect(type_name).map(|schema| schema.qualified_table())
    }

    fn fields(&self, type_name: &str) -> Option<Vec<FieldMapping>> {
        self.reflect(type_name).map(|schema| schema.fields)
    }

    fn associations(&self, type_name: &str) -> Option<Vec<Association>> {
        self.reflect(type_name).map(|schema| schema.associations)
    }
}

/// Schema loading and lookup error
#[derive(Debug, Clone, thiserror::Error)]
pub enum SchemaError {
    #[error("Type not found: {0}")]
    TypeNotFound(String),

    #[error("Field not found: {type_name}.{field}")]
    FieldNotFound { type_name: String, field: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<SchemaError> for EsqlError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::TypeNotFound(name) => EsqlError::type_not_found(name),
            SchemaError::FieldNotFound { type_name, field } => EsqlError::Schema {
                code: ESQL0302,
                message: format!("type '{type_name}' has no field '{field}'"),
                type_name: Some(type_name),
            },
            SchemaError::ParseError(message) => EsqlError::schema(message).with_code(ESQL0301),
            SchemaError::IoError(message) => EsqlError::system(ESQL0401, message),
        }
    }
}
