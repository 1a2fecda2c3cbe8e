#![allow(dead_code)]

use esql_resolver::SchemaResolver;
use esql_schema::{Association, FieldMapping, SchemaRegistry, SchemaType};
use esql_types::{ColumnType, Dialect};
use std::sync::Arc;

pub fn registry() -> SchemaRegistry {
    SchemaRegistry::from_types([
        SchemaType::new("Car", "car")
            .with_id(FieldMapping::new("id", "id", ColumnType::Integer))
            .with_field(FieldMapping::new("name", "name", ColumnType::String))
            .with_field(FieldMapping::new("color", "color", ColumnType::String).nullable())
            .with_field(FieldMapping::new("price", "price", ColumnType::Integer))
            .with_field(FieldMapping::new("sold", "sold", ColumnType::Boolean))
            .with_field(FieldMapping::new("releasedAt", "released_at", ColumnType::Date))
            .with_association(Association::many_to_one("model", "Model").with_join_column("model_id", "id")),
        SchemaType::new("Model", "model")
            .with_id(FieldMapping::new("id", "id", ColumnType::Integer))
            .with_field(FieldMapping::new("name", "name", ColumnType::String))
            .with_association(Association::one_to_many("cars", "Car", "model")),
    ])
    .unwrap()
}

pub fn resolver(dialect: Dialect) -> SchemaResolver {
    SchemaResolver::new(Arc::new(registry()), dialect)
}
