//! Typed materialization of mapped rows

use esql_diagnostics::{ESQL0211, EsqlError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Turns the plain value produced by the row mapper into a typed result
pub trait Denormalizer<T> {
    fn denormalize(&self, value: Value, type_name: &str) -> Result<T>;
}

/// Denormalizer backed by `serde_json::from_value`
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeDenormalizer;

impl<T: DeserializeOwned> Denormalizer<T> for SerdeDenormalizer {
    fn denormalize(&self, value: Value, type_name: &str) -> Result<T> {
        serde_json::from_value(value).map_err(|e| {
            EsqlError::mapping(format!("cannot denormalize {type_name}: {e}")).with_code(ESQL0211)
        })
    }
}
