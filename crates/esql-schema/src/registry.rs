//! Schema registry implementing SchemaReflector
//!
//! Holds mapped types loaded from mapping documents or registered in code.

use crate::parser;
use crate::reflector::{SchemaError, SchemaReflector};
use crate::schema::{SchemaType, short_name};
use indexmap::IndexMap;
use log::{debug, trace};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

/// In-memory registry of mapped types
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    types: Arc<RwLock<IndexMap<String, SchemaType>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from already constructed types
    pub fn from_types(types: impl IntoIterator<Item = SchemaType>) -> Result<Self, SchemaError> {
        let registry = Self::new();
        for schema in types {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Add or replace a type.
    ///
    /// Every identifier must name one of the type's fields.
    pub fn register(&self, schema: SchemaType) -> Result<(), SchemaError> {
        if let Some(missing) = schema.identifiers.iter().find(|id| schema.field(id).is_none()) {
            return Err(SchemaError::FieldNotFound {
                type_name: schema.name.clone(),
                field: missing.clone(),
            });
        }
        trace!(
            "registering type {} (table {}, {} fields, {} associations)",
            schema.name,
            schema.qualified_table(),
            schema.fields.len(),
            schema.associations.len()
        );
        self.types.write().insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Load types from a JSON mapping document
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let types = parser::parse_json(json).map_err(|e| SchemaError::ParseError(e.to_string()))?;
        debug!("loaded {} types from JSON mapping", types.len());
        Self::from_types(types)
    }

    /// Load types from a Doctrine XML mapping document
    pub fn from_xml(xml: &str) -> Result<Self, SchemaError> {
        let types = parser::parse_xml(xml).map_err(|e| SchemaError::ParseError(e.to_string()))?;
        debug!("loaded {} types from XML mapping", types.len());
        Self::from_types(types)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        Self::from_json(&read(path.as_ref())?)
    }

    pub fn from_xml_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        Self::from_xml(&read(path.as_ref())?)
    }

    /// Auto-detect and load a mapping file based on extension (.xml or .json)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("xml") => Self::from_xml_file(path),
            Some("json") => Self::from_json_file(path),
            Some(ext) => Err(SchemaError::ParseError(format!(
                "Unsupported file extension: .{ext}. Expected .xml or .json"
            ))),
            None => Err(SchemaError::ParseError(
                "No file extension found. Expected .xml or .json".to_string(),
            )),
        }
    }

    /// Metadata for a type, by full or unambiguous short name
    pub fn get(&self, type_name: &str) -> Result<SchemaType, SchemaError> {
        self.reflect(type_name)
            .ok_or_else(|| SchemaError::TypeNotFound(type_name.to_string()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.reflect(type_name).is_some()
    }

    /// Registered type names in registration order
    pub fn type_names(&self) -> Vec<String> {
        self.types.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl SchemaReflector for SchemaRegistry {
    fn reflect(&self, type_name: &str) -> Option<SchemaType> {
        let types = self.types.read();
        if let Some(schema) = types.get(type_name) {
            return Some(schema.clone());
        }
        let mut by_short_name = types.values().filter(|s| s.short_name() == short_name(type_name));
        match (by_short_name.next(), by_short_name.next()) {
            (Some(schema), None) => Some(schema.clone()),
            _ => None,
        }
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

fn read(path: &Path) -> Result<String, SchemaError> {
    std::fs::read_to_string(path)
        .map_err(|e| SchemaError::IoError(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldMapping;
    use esql_types::ColumnType;

    #[test]
    fn test_short_name_lookup() {
        let registry = SchemaRegistry::from_types([SchemaType::new("App\\Entity\\Car", "car")
            .with_id(FieldMapping::new("id", "id", ColumnType::Integer))])
        .unwrap();

        assert!(registry.contains("Car"));
        assert_eq!(registry.get("Car").unwrap().name, "App\\Entity\\Car");
        assert!(matches!(
            registry.get("Truck"),
            Err(SchemaError::TypeNotFound(name)) if name == "Truck"
        ));
    }

    #[test]
    fn test_ambiguous_short_name_not_resolved() {
        let registry = SchemaRegistry::from_types([
            SchemaType::new("A\\Car", "a_car"),
            SchemaType::new("B\\Car", "b_car"),
        ])
        .unwrap();

        assert!(registry.reflect("Car").is_none());
        assert!(registry.reflect("B\\Car").is_some());
    }

    #[test]
    fn test_identifier_must_be_a_field() {
        let mut schema = SchemaType::new("Car", "car");
        schema.identifiers.push("id".to_string());

        let err = SchemaRegistry::new().register(schema).unwrap_err();
        assert!(matches!(err, SchemaError::FieldNotFound { .. }));
    }
}
