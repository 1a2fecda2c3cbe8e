//! Schema loading shared by every command

use anyhow::{Context as _, Result, anyhow};
use esql_resolver::{Context, SchemaResolver};
use esql_schema::SchemaRegistry;
use esql_types::Dialect;
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable consulted when `--schema` is not given
pub const SCHEMA_ENV: &str = "ESQL_SCHEMA";

/// A loaded mapping file and the resolver built on it
pub struct Session {
    schema_path: PathBuf,
    registry: SchemaRegistry,
    resolver: SchemaResolver,
}

impl Session {
    /// Load the mapping file at `schema`, falling back to `$ESQL_SCHEMA`
    pub fn open(schema: Option<&Path>, dialect: Dialect) -> Result<Self> {
        let schema_path = match schema {
            Some(path) => path.to_path_buf(),
            None => std::env::var_os(SCHEMA_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
                .ok_or_else(|| anyhow!("no mapping file given (use --schema or set {SCHEMA_ENV})"))?,
        };
        Self::load(schema_path, dialect)
    }

    pub fn load(schema_path: PathBuf, dialect: Dialect) -> Result<Self> {
        let registry = SchemaRegistry::from_file(&schema_path)
            .with_context(|| format!("Failed to load mapping file: {}", schema_path.display()))?;
        info!(
            "loaded {} types from {} ({dialect})",
            registry.len(),
            schema_path.display()
        );
        let resolver = SchemaResolver::new(Arc::new(registry.clone()), dialect);
        Ok(Self {
            schema_path,
            registry,
            resolver,
        })
    }

    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }

    pub fn type_names(&self) -> Vec<String> {
        self.registry.type_names()
    }

    /// Root context for `type_name`, optionally presented as `map_to`
    pub fn root(&self, type_name: &str, map_to: Option<&str>) -> Result<Context> {
        let ctx = match map_to {
            Some(map_to) => self.resolver.resolve_as(type_name, map_to)?,
            None => self.resolver.resolve(type_name)?,
        };
        Ok(ctx)
    }
}
